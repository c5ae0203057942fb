use face_common::{landmark, LandmarkSet, Region};
use image::RgbImage;
use mesh_warp::{warp_with_stats, ControlSet};
use tracing::debug;

use crate::{
    config::JawParams,
    error::{StageError, StageResult},
    stage::{Stage, StageKind},
    stages::to_f32,
};

/// Slims the jaw by pulling the contour from ear to ear toward the vertical
/// line through the nose tip
pub struct JawStage {
    params: JawParams,
}

impl JawStage {
    pub fn new(params: JawParams) -> Self {
        Self { params }
    }

    fn controls(&self, width: u32, height: u32, landmarks: &LandmarkSet) -> ControlSet {
        let midline = landmarks.point(landmark::NOSE_TIP)[0] as f32;
        let mut controls = ControlSet::new(width, height);

        for index in Region::jaw_moving() {
            let [x, y] = to_f32(landmarks.point(index));
            let target = x + (midline - x) * self.params.thinning;
            controls.push_moving([x, y], [target, y]);
        }
        controls.extend_anchors(landmarks.region(Region::JawPins).into_iter().map(to_f32));

        if self.params.ear_pins {
            // hold the cheek skin between each ear and the start of the jaw
            for (ear, start) in [
                (landmark::RIGHT_EAR, landmark::RIGHT_JAW_START),
                (landmark::LEFT_EAR, landmark::LEFT_JAW_START),
            ] {
                let e = landmarks.point(ear);
                let s = landmarks.point(start);
                let near = [(2 * e[0] + s[0]).div_euclid(3), (2 * e[1] + s[1]).div_euclid(3)];
                let far = [(e[0] + 2 * s[0]).div_euclid(3), (e[1] + 2 * s[1]).div_euclid(3)];
                controls.push_anchor(to_f32(near));
                controls.push_anchor(to_f32(far));
            }
        }
        controls
    }
}

impl Stage for JawStage {
    fn kind(&self) -> StageKind {
        StageKind::Jaw
    }

    fn apply(&self, image: &RgbImage, landmarks: &LandmarkSet) -> StageResult<RgbImage> {
        let controls = self.controls(image.width(), image.height(), landmarks);
        if !controls.has_motion() {
            return Err(StageError::degenerate("jaw points do not move"));
        }
        let (result, stats) = warp_with_stats(image, &controls)?;
        debug!("Jaw warp: {:?}", stats);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_common::synthetic;
    use image::Rgb;
    use mask::RegionMask;

    const SKIN: Rgb<u8> = Rgb([210, 170, 150]);

    /// Face-coloured oval on a dark background
    fn portrait(width: u32, height: u32, landmarks: &LandmarkSet) -> RgbImage {
        let oval = RegionMask::polygon_region(width, height, &landmarks.region(Region::FaceOval));
        RgbImage::from_fn(width, height, |x, y| {
            if oval.value(x, y) > 0.0 { SKIN } else { Rgb([30, 40, 60]) }
        })
    }

    fn face_width_at(image: &RgbImage, y: u32) -> usize {
        (0..image.width())
            .filter(|&x| image.get_pixel(x, y)[0] > 120)
            .count()
    }

    #[test]
    fn test_jaw_narrows_and_keeps_narrowing() {
        let landmarks = synthetic::face(400, 400);
        let image = portrait(400, 400, &landmarks);
        let row = landmarks.point(172)[1] as u32;
        let stage = JawStage::new(JawParams::default());

        let once = stage.apply(&image, &landmarks).unwrap();
        let twice = stage.apply(&once, &landmarks).unwrap();

        let (w0, w1, w2) = (face_width_at(&image, row), face_width_at(&once, row), face_width_at(&twice, row));
        assert!(w1 < w0, "{w1} should be narrower than {w0}");
        assert!(w2 < w1, "{w2} should be narrower than {w1}");
        assert_eq!(twice.dimensions(), image.dimensions());
    }

    #[test]
    fn test_border_is_untouched() {
        let landmarks = synthetic::face(300, 300);
        let image = portrait(300, 300, &landmarks);
        let out = JawStage::new(JawParams::default()).apply(&image, &landmarks).unwrap();
        for x in 0..300 {
            assert_eq!(out.get_pixel(x, 0), image.get_pixel(x, 0));
            assert_eq!(out.get_pixel(x, 299), image.get_pixel(x, 299));
        }
    }

    #[test]
    fn test_collapsed_landmarks_do_not_move() {
        let image = RgbImage::new(50, 50);
        let err = JawStage::new(JawParams::default())
            .apply(&image, &synthetic::collapsed(50, 50))
            .unwrap_err();
        assert!(err.is_recoverable());
    }
}
