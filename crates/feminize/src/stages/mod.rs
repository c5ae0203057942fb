//! Feature stages.
//!
//! Each stage derives its working regions from the landmark set only, never
//! from pixels an earlier stage may have moved.

mod beard;
mod brows;
mod cheeks;
mod chin;
mod eyes;
mod hair;
mod jaw;
mod lips;
mod nose;
mod skin;

pub use beard::BeardStage;
pub use brows::BrowStage;
pub use cheeks::CheekStage;
pub use chin::ChinStage;
pub use eyes::EyeStage;
pub use hair::HairStage;
pub use jaw::JawStage;
pub use lips::LipStage;
pub use nose::NoseStage;
pub use skin::SkinStage;

use std::sync::Arc;

use face_common::PixelRect;
use image::{Rgb, RgbImage};

use crate::{
    config::FeminizeConfig,
    error::{StageError, StageResult},
    stage::{Stage, StageKind},
};

/// Instantiate a stage from its parameter block
pub fn build_stage(kind: StageKind, config: &FeminizeConfig, hair_asset: Option<Arc<RgbImage>>) -> Box<dyn Stage> {
    match kind {
        StageKind::Nose => Box::new(NoseStage::new(config.nose.clone())),
        StageKind::Jaw => Box::new(JawStage::new(config.jaw.clone())),
        StageKind::Chin => Box::new(ChinStage::new(config.chin.clone())),
        StageKind::Cheeks => Box::new(CheekStage::new(config.cheeks.clone())),
        StageKind::Beard => Box::new(BeardStage::new(config.beard.clone())),
        StageKind::Skin => Box::new(SkinStage::new(config.skin.clone())),
        StageKind::Eyes => Box::new(EyeStage::new(config.eyes.clone())),
        StageKind::Brows => Box::new(BrowStage::new(config.brows.clone())),
        StageKind::Lips => Box::new(LipStage::new(config.lips.clone())),
        StageKind::Hair => Box::new(HairStage::new(config.hair.clone(), hair_asset)),
    }
}

pub(crate) fn rgb(color: [u8; 3]) -> Rgb<u8> {
    Rgb(color)
}

pub(crate) fn to_f32(point: [i32; 2]) -> [f32; 2] {
    [point[0] as f32, point[1] as f32]
}

/// Tight box around `points`, rejecting sets that collapse to a line or a dot
pub(crate) fn landmark_extent(points: &[[i32; 2]], what: &str) -> StageResult<PixelRect> {
    match PixelRect::enclosing(points) {
        Some(rect) if rect.width > 1 && rect.height > 1 => Ok(rect),
        _ => Err(StageError::degenerate(format!("{what} landmarks have no extent"))),
    }
}

/// Run a per-side edit, keeping the previous image for a side that turns
/// out degenerate. Fails only when every side was degenerate or a side hit
/// an unrecoverable error.
pub(crate) fn apply_per_side<F>(image: RgbImage, sides: usize, what: &str, mut edit: F) -> StageResult<RgbImage>
where
    F: FnMut(&RgbImage, usize) -> StageResult<RgbImage>,
{
    let mut current = image;
    let mut applied = 0;
    for side in 0..sides {
        match edit(&current, side) {
            Ok(next) => {
                current = next;
                applied += 1;
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!("Skipping {} {}: {}", what, side, e);
            }
            Err(e) => return Err(e),
        }
    }
    if applied == 0 {
        return Err(StageError::degenerate(format!("no usable {what}")));
    }
    Ok(current)
}
