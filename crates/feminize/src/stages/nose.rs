use face_common::{LandmarkSet, Region};
use image::RgbImage;
use mask::{
    composite::{clone_or_paste, crop_rgb, resize_rgb_lanczos},
    RegionMask,
};
use tracing::debug;

use crate::{
    config::NoseParams,
    error::{StageError, StageResult},
    stage::{Stage, StageKind},
    stages::landmark_extent,
};

/// Narrows the nose: the padded nose crop is squeezed horizontally and
/// cloned back in the gradient domain so its edges take the surrounding skin
pub struct NoseStage {
    params: NoseParams,
}

impl NoseStage {
    pub fn new(params: NoseParams) -> Self {
        Self { params }
    }
}

impl Stage for NoseStage {
    fn kind(&self) -> StageKind {
        StageKind::Nose
    }

    fn apply(&self, image: &RgbImage, landmarks: &LandmarkSet) -> StageResult<RgbImage> {
        let nose = landmarks.points(&Region::nose());
        let extent = landmark_extent(&nose, "nose")?;
        let roi = extent
            .padded_within(self.params.padding, image.width(), image.height())
            .ok_or_else(|| StageError::degenerate("nose lies off the image"))?;

        let new_width = (roi.width as f32 * self.params.width_scale) as u32;
        if new_width < 3 || roi.height < 3 {
            return Err(StageError::degenerate("nose crop too small"));
        }
        debug!("Nose crop {:?} narrowed to {} px", roi, new_width);

        let crop = crop_rgb(image, roi);
        let narrowed = resize_rgb_lanczos(&crop, new_width, roi.height as u32);
        let mask = RegionMask::full(narrowed.width(), narrowed.height());

        match clone_or_paste(&narrowed, image, &mask, roi.center()) {
            Ok(result) => Ok(result),
            Err(e) if e.is_recoverable() => Ok(image.clone()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_common::synthetic;
    use image::Rgb;

    #[test]
    fn test_nose_stage_changes_only_the_nose_area() {
        let image = RgbImage::from_fn(300, 300, |x, y| Rgb([(x % 200) as u8, (y % 150) as u8, 120]));
        let landmarks = synthetic::face(300, 300);
        let out = NoseStage::new(NoseParams::default()).apply(&image, &landmarks).unwrap();

        assert_eq!(out.dimensions(), image.dimensions());
        let roi = landmarks
            .bounding_rect(&Region::nose())
            .unwrap()
            .padded_within(20, 300, 300)
            .unwrap();
        for (x, y, pixel) in out.enumerate_pixels() {
            if !roi.contains(x as i32, y as i32) {
                assert_eq!(pixel, image.get_pixel(x, y));
            }
        }
        assert_ne!(out, image);
    }

    #[test]
    fn test_collapsed_nose_is_degenerate() {
        let image = RgbImage::new(100, 100);
        let err = NoseStage::new(NoseParams::default())
            .apply(&image, &synthetic::collapsed(100, 100))
            .unwrap_err();
        assert!(err.is_recoverable());
    }
}
