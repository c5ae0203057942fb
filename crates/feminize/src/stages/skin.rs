use face_common::{LandmarkSet, Region};
use image::RgbImage;
use mask::{bilateral_smooth, composite::blend, RegionMask};
use tracing::debug;

use crate::{
    config::SkinParams,
    error::{StageError, StageResult},
    stage::{Stage, StageKind},
};

/// Edge-preserving smoothing over the face oval, keeping eyes, brows and
/// lips sharp
pub struct SkinStage {
    params: SkinParams,
}

impl SkinStage {
    pub fn new(params: SkinParams) -> Self {
        Self { params }
    }

    fn skin_mask(&self, width: u32, height: u32, landmarks: &LandmarkSet) -> StageResult<RegionMask> {
        let face = RegionMask::polygon_region(width, height, &landmarks.region(Region::FaceOval));
        let mut features = RegionMask::empty(width, height);
        for region in [Region::LeftEye, Region::RightEye, Region::LipsOuter, Region::LeftBrow, Region::RightBrow] {
            features = features.union(&RegionMask::polygon_region(width, height, &landmarks.region(region)))?;
        }
        let features = features.grow(self.params.exclusion_radius, self.params.exclusion_iterations);
        Ok(face.subtract(&features)?)
    }
}

impl Stage for SkinStage {
    fn kind(&self) -> StageKind {
        StageKind::Skin
    }

    fn apply(&self, image: &RgbImage, landmarks: &LandmarkSet) -> StageResult<RgbImage> {
        let p = &self.params;
        let (w, h) = image.dimensions();
        let skin = self.skin_mask(w, h, landmarks)?.soften(p.edge_softness);
        let Some(area) = skin.bounding_box(0) else {
            return Err(StageError::degenerate("face oval is empty"));
        };
        debug!("Smoothing skin inside {:?}", area);
        let smoothed = bilateral_smooth(image, p.smoothing_radius, p.sigma_color, p.sigma_space, Some(area));
        Ok(blend(&smoothed, image, &skin)?)
    }
}
