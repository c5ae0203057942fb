use face_common::LandmarkSet;
use image::RgbImage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::error::StageResult;

/// The ten feature stages, declared in the order the pipeline runs them
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StageKind {
    Nose,
    Jaw,
    Chin,
    Cheeks,
    Beard,
    Skin,
    Eyes,
    Brows,
    Lips,
    Hair,
}

/// Groups of stages that must run in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    /// Shape is sculpted before any paint goes on
    Structural,
    /// Texture is removed before features are painted
    Cleanup,
    FeaturePainting,
    /// Repaints the whole frame, so the face must already be final
    Compositing,
}

impl StageKind {
    pub fn phase(&self) -> Phase {
        match self {
            Self::Nose | Self::Jaw | Self::Chin | Self::Cheeks => Phase::Structural,
            Self::Beard | Self::Skin => Phase::Cleanup,
            Self::Eyes | Self::Brows | Self::Lips => Phase::FeaturePainting,
            Self::Hair => Phase::Compositing,
        }
    }

    pub fn names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }
}

/// One named step of the pipeline.
///
/// A stage reads the landmark set and the current image and returns a new
/// image of the same size; it never writes its input. Degenerate geometry is
/// reported through a recoverable [`crate::StageError`], which the pipeline
/// turns into "input unchanged".
pub trait Stage: Send + Sync {
    fn kind(&self) -> StageKind;

    fn apply(&self, image: &RgbImage, landmarks: &LandmarkSet) -> StageResult<RgbImage>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_declaration_order_follows_phases() {
        let kinds: Vec<StageKind> = StageKind::iter().collect();
        assert_eq!(kinds.first(), Some(&StageKind::Nose));
        assert_eq!(kinds.last(), Some(&StageKind::Hair));
        for pair in kinds.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].phase() <= pair[1].phase());
        }
    }

    #[test]
    fn test_names_round_trip() {
        assert_eq!(StageKind::from_str("brows").unwrap(), StageKind::Brows);
        assert_eq!(StageKind::Cheeks.to_string(), "cheeks");
        assert_eq!(serde_json::to_string(&StageKind::Lips).unwrap(), "\"lips\"");
        assert_eq!(StageKind::names().len(), 10);
    }
}
