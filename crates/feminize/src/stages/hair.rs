use std::sync::Arc;

use face_common::{landmark, LandmarkSet, PixelRect, Region, MESH_COUNT};
use image::{Rgb, RgbImage};
use mask::{
    composite::{blend, median_color, paste_centered, resize_rgb_lanczos},
    Close, Grow, Open, RegionMask, Shrink, Soften,
};
use tracing::{debug, warn};

use crate::{
    config::HairParams,
    error::{StageError, StageResult},
    stage::{Stage, StageKind},
    stages::landmark_extent,
};

const FACE_GROW_ITERATIONS: u32 = 2;
const FACE_EDGE_SOFTNESS: u32 = 7;
const HAIR_CLOSE_ITERATIONS: u32 = 2;

/// Replaces the hairline: the top of the head is repainted with the
/// background colour, a hairstyle asset is laid over it and the centre of
/// the face is restored on top
pub struct HairStage {
    params: HairParams,
    asset: Option<Arc<RgbImage>>,
}

impl HairStage {
    pub fn new(params: HairParams, asset: Option<Arc<RgbImage>>) -> Self {
        Self { params, asset }
    }

    /// HSV-style saturation in `0..=255`
    fn saturation(pixel: &Rgb<u8>) -> u8 {
        let max = pixel.0.iter().copied().max().unwrap_or(0);
        let min = pixel.0.iter().copied().min().unwrap_or(0);
        if max == 0 {
            return 0;
        }
        ((max - min) as u32 * 255 / max as u32) as u8
    }

    /// Scale the asset to the face and cut the hair out of its background
    fn prepare_asset(&self, asset: &RgbImage, face: PixelRect) -> StageResult<(RgbImage, RegionMask)> {
        let p = &self.params;
        let (aw, ah) = asset.dimensions();
        if aw == 0 || ah == 0 {
            return Err(StageError::degenerate("hair asset is empty"));
        }
        let target_w = (face.width as f32 * p.width_ratio) as u32;
        let target_h = (target_w as f32 * ah as f32 / aw as f32) as u32;
        if target_w == 0 || target_h == 0 {
            return Err(StageError::degenerate("face too small for the hair asset"));
        }
        let hair = resize_rgb_lanczos(asset, target_w, target_h);
        let threshold = p.saturation_threshold;
        let mask = RegionMask::from_threshold(target_w, target_h, |x, y| {
            Self::saturation(hair.get_pixel(x, y)) > threshold
        })
        .refine(&[
            &Close { radius: 1, iterations: HAIR_CLOSE_ITERATIONS },
            &Open { radius: 1, iterations: 1 },
            &Soften { radius: 1, sigma: 0.0 },
        ]);
        Ok((hair, mask))
    }

    /// Top of the head, excluding the face and everything from ear level down
    fn scalp_mask(&self, width: u32, height: u32, landmarks: &LandmarkSet) -> StageResult<RegionMask> {
        let head = landmarks
            .leading_bounding_rect(MESH_COUNT)
            .ok_or_else(|| StageError::degenerate("no mesh points"))?;
        let center = [head.x + head.width / 2, head.y + (head.height as f32 * 0.4) as i32];
        let radii = [(head.width as f32 * 0.9) as i32, (head.height as f32 * 0.7) as i32];
        let mut scalp = RegionMask::from_ellipse(width, height, center, radii);
        scalp.clear_below((head.y as f32 + head.height as f32 * 0.6) as i32);

        let face = RegionMask::polygon_region(width, height, &landmarks.region(Region::FaceOval));
        let mut scalp = scalp.subtract(&face)?;

        let [chin_x, chin_y] = landmarks.point(landmark::CHIN_TIP);
        let neck_w = (head.width as f32 * 0.55) as i32;
        scalp.clear_rect(PixelRect::new(chin_x - neck_w / 2, chin_y, neck_w + 1, height as i32 - chin_y));
        Ok(scalp)
    }
}

impl Stage for HairStage {
    fn kind(&self) -> StageKind {
        StageKind::Hair
    }

    fn apply(&self, image: &RgbImage, landmarks: &LandmarkSet) -> StageResult<RgbImage> {
        let p = &self.params;
        let asset = self
            .asset
            .as_ref()
            .ok_or_else(|| StageError::degenerate("no hairstyle asset loaded"))?;
        let (w, h) = image.dimensions();

        let oval = landmarks.region(Region::FaceOval);
        let face_box = landmark_extent(&oval, "face oval")?;
        let face = RegionMask::polygon_region(w, h, &oval).refine(&[
            &Grow { radius: p.face_grow_radius, iterations: FACE_GROW_ITERATIONS },
            &Soften { radius: FACE_EDGE_SOFTNESS, sigma: 0.0 },
        ]);

        let strip = ((h as f32 * p.background_strip) as i32).max(10);
        let background = median_color(image, PixelRect::new(0, 0, w as i32, strip))
            .ok_or_else(|| StageError::degenerate("image has no background strip"))?;
        debug!("Hair background colour {:?}", background);

        let scalp = self.scalp_mask(w, h, landmarks)?;
        let mut result = image.clone();
        for (x, y, pixel) in result.enumerate_pixels_mut() {
            if scalp.value(x, y) > 0.0 {
                *pixel = background;
            }
        }

        let (hair, hair_mask) = self.prepare_asset(asset, face_box)?;
        match paste_centered(&result, &hair, &hair_mask, face_box.center()) {
            Ok(pasted) => result = pasted,
            Err(e) if e.is_recoverable() => warn!("Hairstyle not placed: {}", e),
            Err(e) => return Err(e.into()),
        }

        let core = face.refine(&[
            &Shrink { radius: p.face_core_radius, iterations: p.face_core_iterations },
            &Soften { radius: p.face_core_softness, sigma: 0.0 },
        ]);
        Ok(blend(image, &result, &core)?)
    }
}
