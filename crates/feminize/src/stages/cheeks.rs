use face_common::{distance, landmark, LandmarkSet};
use image::RgbImage;
use mask::{
    composite::{add_weighted, blend, brighten, solid},
    RegionMask,
};

use crate::{
    config::CheekParams,
    error::{StageError, StageResult},
    stage::{Stage, StageKind},
    stages::{apply_per_side, rgb},
};

/// Blush on each cheekbone with a smaller highlight set above and inward of it
pub struct CheekStage {
    params: CheekParams,
}

impl CheekStage {
    pub fn new(params: CheekParams) -> Self {
        Self { params }
    }

    fn paint(&self, image: &RgbImage, center: [i32; 2], radius: i32, midline: i32) -> StageResult<RgbImage> {
        let p = &self.params;
        let (w, h) = image.dimensions();

        let blush_mask = RegionMask::from_circle(w, h, center, radius)
            .soften_sigma(p.blush_blur_radius, p.blush_blur_sigma);
        if blush_mask.is_empty() {
            return Err(StageError::degenerate("blush lies off the image"));
        }
        let tinted = add_weighted(image, 1.0, &solid(w, h, rgb(p.blush_color)), p.blush_density, 0.0)?;
        let blushed = blend(&tinted, image, &blush_mask.scale(p.blush_opacity))?;

        let hl_radius = (radius as f32 * p.highlight_scale) as i32;
        let inward = (radius as f32 * p.highlight_inward) as i32 * (midline - center[0]).signum();
        let hl_center = [center[0] + inward, center[1] - (radius as f32 * p.highlight_lift) as i32];
        let hl_mask = RegionMask::from_circle(w, h, hl_center, hl_radius)
            .soften_sigma(p.highlight_blur_radius, p.highlight_blur_sigma);
        if hl_mask.is_empty() {
            return Ok(blushed);
        }
        let lit = brighten(&blushed, p.highlight_amount);
        Ok(blend(&lit, &blushed, &hl_mask.scale(p.highlight_opacity))?)
    }
}

impl Stage for CheekStage {
    fn kind(&self) -> StageKind {
        StageKind::Cheeks
    }

    fn apply(&self, image: &RgbImage, landmarks: &LandmarkSet) -> StageResult<RgbImage> {
        let centers = [
            landmarks.point(landmark::LEFT_CHEEK_CENTER),
            landmarks.point(landmark::RIGHT_CHEEK_CENTER),
        ];
        let radius = (distance(centers[0], centers[1]) * self.params.radius_ratio) as i32;
        if radius < 1 {
            return Err(StageError::degenerate("cheek centres coincide"));
        }
        let midline = landmarks.point(landmark::NOSE_TIP)[0];
        apply_per_side(image.clone(), 2, "cheek", |current, side| {
            self.paint(current, centers[side], radius, midline)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_common::synthetic;
    use image::Rgb;

    #[test]
    fn test_blush_warms_the_cheeks_only() {
        let image = RgbImage::from_pixel(400, 400, Rgb([150, 150, 150]));
        let landmarks = synthetic::face(400, 400);
        let out = CheekStage::new(CheekParams::default()).apply(&image, &landmarks).unwrap();

        for index in [landmark::LEFT_CHEEK_CENTER, landmark::RIGHT_CHEEK_CENTER] {
            let [x, y] = landmarks.point(index);
            let pixel = out.get_pixel(x as u32, y as u32);
            assert!(pixel[0] > 150, "cheek should be warmer: {pixel:?}");
            assert!(pixel[0] > pixel[1]);
        }
        assert_eq!(out.get_pixel(200, 5), image.get_pixel(200, 5));
        assert_eq!(out.get_pixel(200, 395), image.get_pixel(200, 395));
    }

    #[test]
    fn test_highlight_sits_above_and_inside_the_blush() {
        let image = RgbImage::from_pixel(400, 400, Rgb([100, 100, 100]));
        let params = CheekParams {
            blush_opacity: 0.0,
            highlight_amount: 200,
            highlight_opacity: 1.0,
            ..CheekParams::default()
        };
        let landmarks = synthetic::face(400, 400);
        let out = CheekStage::new(params).apply(&image, &landmarks).unwrap();

        // right cheek sits left of the midline, so the highlight shifts right
        let [x, y] = landmarks.point(landmark::RIGHT_CHEEK_CENTER);
        let above = out.get_pixel(x as u32 + 3, (y - 10) as u32)[0];
        let below = out.get_pixel(x as u32 - 3, (y + 10) as u32)[0];
        assert!(above > below, "{above} vs {below}");
    }

    #[test]
    fn test_collapsed_centres_are_degenerate() {
        let err = CheekStage::new(CheekParams::default())
            .apply(&RgbImage::new(30, 30), &synthetic::collapsed(30, 30))
            .unwrap_err();
        assert!(err.is_recoverable());
    }
}
