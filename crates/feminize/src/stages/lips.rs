use face_common::{LandmarkSet, Region};
use image::RgbImage;
use mask::{
    composite::{add_weighted, crop_rgb, paste_centered, resize_rgb, solid},
    RegionMask,
};
use tracing::debug;

use crate::{
    config::LipParams,
    error::{StageError, StageResult},
    stage::{Stage, StageKind},
    stages::{landmark_extent, rgb},
};

/// Tints the lips and plumps them by pasting an enlarged copy back through
/// the lip outline
pub struct LipStage {
    params: LipParams,
}

impl LipStage {
    pub fn new(params: LipParams) -> Self {
        Self { params }
    }
}

impl Stage for LipStage {
    fn kind(&self) -> StageKind {
        StageKind::Lips
    }

    fn apply(&self, image: &RgbImage, landmarks: &LandmarkSet) -> StageResult<RgbImage> {
        let p = &self.params;
        let (w, h) = image.dimensions();
        let outline = landmarks.region(Region::LipsOuter);
        let roi = landmark_extent(&outline, "lip")?
            .padded_within(p.padding, w, h)
            .ok_or_else(|| StageError::degenerate("lips lie off the image"))?;
        if roi.width < p.min_size || roi.height < p.min_size {
            return Err(StageError::degenerate(format!("lips too small: {}x{}", roi.width, roi.height)));
        }

        let lip_mask = RegionMask::polygon_region(w, h, &outline)
            .crop(roi)
            .soften(p.edge_softness);
        let crop = crop_rgb(image, roi);
        let lipstick = solid(crop.width(), crop.height(), rgb(p.color));
        let tinted = add_weighted(&crop, 1.0 - p.color_ratio, &lipstick, p.color_ratio, 0.0)?;

        let new_w = (roi.width as f32 * p.scale) as u32;
        let new_h = (roi.height as f32 * p.scale) as u32;
        debug!("Lips {:?} plumped to {}x{}", roi, new_w, new_h);
        let plumped = resize_rgb(&tinted, new_w, new_h);
        let plumped_mask = lip_mask.resize(new_w, new_h);

        Ok(paste_centered(image, &plumped, &plumped_mask, roi.center())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_common::synthetic;
    use image::Rgb;

    #[test]
    fn test_lips_take_the_lipstick_tint() {
        let image = RgbImage::from_pixel(400, 400, Rgb([128, 128, 128]));
        let landmarks = synthetic::face(400, 400);
        let out = LipStage::new(LipParams::default()).apply(&image, &landmarks).unwrap();

        let [x, top] = landmarks.point(0);
        let [_, bottom] = landmarks.point(17);
        let pixel = out.get_pixel(x as u32, ((top + bottom) / 2) as u32);
        assert!(pixel[0] > pixel[1] && pixel[2] > pixel[1], "{pixel:?}");
        assert_eq!(out.get_pixel(200, 100), image.get_pixel(200, 100));
    }

    #[test]
    fn test_plumped_lips_reach_past_the_outline() {
        let image = RgbImage::from_pixel(400, 400, Rgb([128, 128, 128]));
        let landmarks = synthetic::face(400, 400);
        let out = LipStage::new(LipParams::default()).apply(&image, &landmarks).unwrap();

        // just outside the right mouth corner
        let [x, y] = landmarks.point(291);
        let pixel = out.get_pixel(x as u32 + 2, y as u32);
        assert!(pixel[0] > 128, "{pixel:?}");
    }

    #[test]
    fn test_tiny_lips_are_left_alone() {
        let params = LipParams { min_size: 1000, ..LipParams::default() };
        let err = LipStage::new(params)
            .apply(&RgbImage::new(400, 400), &synthetic::face(400, 400))
            .unwrap_err();
        assert!(err.is_recoverable());
    }
}
