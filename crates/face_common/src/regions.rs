//! Named landmark registry.
//!
//! Every facial area a stage works on is looked up here; stages never carry
//! their own index lists. Indices follow the refined face-mesh topology, where
//! "left" is the subject's left (the right-hand side of the image).

use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

/// Single landmarks with a fixed meaning
pub mod landmark {
    pub const NOSE_TIP: usize = 1;
    pub const CHIN_TIP: usize = 152;
    pub const FOREHEAD: usize = 10;
    pub const LEFT_CHEEK_CENTER: usize = 425;
    pub const RIGHT_CHEEK_CENTER: usize = 205;
    /// Ear-side end of the jaw contour, image left
    pub const RIGHT_EAR: usize = 234;
    /// Ear-side end of the jaw contour, image right
    pub const LEFT_EAR: usize = 454;
    /// First moving jaw point after the right ear
    pub const RIGHT_JAW_START: usize = 93;
    /// First moving jaw point after the left ear
    pub const LEFT_JAW_START: usize = 323;
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Region {
    LipsUpper,
    LipsLower,
    /// Closed outer lip contour: upper lip left to right, lower lip back
    LipsOuter,
    LeftEye,
    RightEye,
    LeftBrow,
    RightBrow,
    NoseBridge,
    NoseTip,
    Nostrils,
    /// Bridge, tip, nostrils and outer wings; the protected nose area
    NoseWide,
    JawContour,
    JawRight,
    JawLeft,
    /// Jaw warp pins: ears, nose tip, mouth corners, forehead, temples
    JawPins,
    ChinMoving,
    ChinPins,
    LeftCheek,
    RightCheek,
    FaceOval,
    MoustacheTop,
    MoustacheLipTop,
    SideburnLeft,
    SideburnRight,
}

impl Region {
    pub fn indices(&self) -> &'static [usize] {
        match self {
            Self::LipsUpper => &[61, 185, 40, 39, 37, 0, 267, 269, 270, 409, 291],
            Self::LipsLower => &[146, 91, 181, 84, 17, 314, 405, 321, 375, 291],
            Self::LipsOuter => &[
                61, 185, 40, 39, 37, 0, 267, 269, 270, 409, 291,
                375, 321, 405, 314, 17, 84, 181, 91, 146,
            ],
            Self::LeftEye => &[362, 382, 381, 380, 374, 373, 390, 249, 263, 466, 388, 387, 386, 385, 384, 398],
            Self::RightEye => &[33, 7, 163, 144, 145, 153, 154, 155, 133, 173, 157, 158, 159, 160, 161, 246],
            Self::LeftBrow => &[276, 283, 282, 295, 285, 336, 296, 334, 293, 300],
            Self::RightBrow => &[46, 53, 52, 65, 55, 107, 66, 105, 63, 70],
            Self::NoseBridge => &[1, 2, 98, 327],
            Self::NoseTip => &[4],
            Self::Nostrils => &[102, 218, 331, 48],
            Self::NoseWide => &[1, 2, 98, 327, 4, 102, 218, 331, 48, 49, 279],
            Self::JawContour => &[
                234, 93, 132, 58, 172, 136, 150, 149, 176, 148, 152,
                377, 400, 378, 379, 365, 397, 288, 361, 323, 454,
            ],
            Self::JawRight => &[93, 132, 58, 172, 136, 150, 149, 176, 148],
            Self::JawLeft => &[377, 400, 378, 379, 365, 397, 288, 361, 323],
            Self::JawPins => &[234, 454, 1, 61, 291, 10, 127, 356],
            Self::ChinMoving => &[152, 148, 377, 176, 400],
            Self::ChinPins => &[132, 361, 17, 0, 164, 18, 1],
            Self::LeftCheek => &[425, 266, 329, 348],
            Self::RightCheek => &[205, 36, 100, 119],
            Self::FaceOval => &[
                10, 338, 297, 332, 284, 251, 389, 356, 454, 323, 361, 288,
                397, 365, 379, 378, 400, 377, 152, 148, 176, 149, 150, 136,
                172, 58, 132, 93, 234, 127, 162, 21, 54, 103, 67, 109,
            ],
            Self::MoustacheTop => &[102, 2, 331],
            Self::MoustacheLipTop => &[61, 40, 37, 0, 267, 270, 291],
            Self::SideburnLeft => &[454, 323, 361, 365],
            Self::SideburnRight => &[234, 93, 132, 136],
        }
    }

    /// The full nose, as used for the nose reshaping crop
    pub fn nose() -> Vec<usize> {
        [Self::NoseBridge, Self::Nostrils, Self::NoseTip]
            .iter()
            .flat_map(|r| r.indices().iter().copied())
            .collect()
    }

    /// Moving points of the jaw warp, ear to ear through the chin
    pub fn jaw_moving() -> Vec<usize> {
        let mut indices = Self::JawRight.indices().to_vec();
        indices.push(landmark::CHIN_TIP);
        indices.extend_from_slice(Self::JawLeft.indices());
        indices
    }

    /// Get a list of all region names
    pub fn names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }
}
