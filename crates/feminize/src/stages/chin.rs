use face_common::{landmark, LandmarkSet, Region};
use image::RgbImage;
use mesh_warp::{warp_with_stats, ControlSet};
use tracing::debug;

use crate::{
    config::ChinParams,
    error::{StageError, StageResult},
    stage::{Stage, StageKind},
    stages::to_f32,
};

/// Lifts and narrows the chin tip. Only the five points around the tip
/// move; the jaw angles and the mouth axis stay pinned.
pub struct ChinStage {
    params: ChinParams,
}

impl ChinStage {
    pub fn new(params: ChinParams) -> Self {
        Self { params }
    }
}

impl Stage for ChinStage {
    fn kind(&self) -> StageKind {
        StageKind::Chin
    }

    fn apply(&self, image: &RgbImage, landmarks: &LandmarkSet) -> StageResult<RgbImage> {
        let [nose_x, nose_y] = to_f32(landmarks.point(landmark::NOSE_TIP));
        let chin_y = landmarks.point(landmark::CHIN_TIP)[1] as f32;
        let reach = chin_y - nose_y;
        if reach <= 0.0 {
            return Err(StageError::degenerate("chin is not below the nose"));
        }
        let lift = reach * self.params.lift;

        let mut controls = ControlSet::new(image.width(), image.height());
        for [x, y] in landmarks.region(Region::ChinMoving).into_iter().map(to_f32) {
            controls.push_moving([x, y], [x + (nose_x - x) * self.params.narrow, y - lift]);
        }
        controls.extend_anchors(landmarks.region(Region::ChinPins).into_iter().map(to_f32));
        if !controls.has_motion() {
            return Err(StageError::degenerate("chin points do not move"));
        }

        let (result, stats) = warp_with_stats(image, &controls)?;
        debug!("Chin warp: lift {:.1}px, {:?}", lift, stats);
        Ok(result)
    }
}
