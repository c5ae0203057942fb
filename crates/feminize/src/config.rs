//! Stage parameters.
//!
//! Every block deserializes with defaults, so a configuration file only
//! needs to name the values it changes. Colours are RGB.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::stage::StageKind;

/// Parameters for the whole pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FeminizeConfig {
    pub nose: NoseParams,
    pub jaw: JawParams,
    pub chin: ChinParams,
    pub cheeks: CheekParams,
    pub beard: BeardParams,
    pub skin: SkinParams,
    pub eyes: EyeParams,
    pub brows: BrowParams,
    pub lips: LipParams,
    pub hair: HairParams,
    /// Stages skipped by a full run
    pub disabled: Vec<StageKind>,
}

impl FeminizeConfig {
    pub fn is_enabled(&self, kind: StageKind) -> bool {
        !self.disabled.contains(&kind)
    }

    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FeminizeConfig)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NoseParams {
    /// Horizontal scale applied to the nose crop
    #[schemars(range(min = 0.5, max = 1.0))]
    pub width_scale: f32,
    /// Pixels added around the nose landmarks before cropping
    pub padding: i32,
}

impl Default for NoseParams {
    fn default() -> Self {
        Self { width_scale: 0.85, padding: 20 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct JawParams {
    /// Fraction of the distance to the facial midline each jaw point moves
    #[schemars(range(min = 0.0, max = 0.3))]
    pub thinning: f32,
    /// Pin the skin between each ear and the first jaw point
    pub ear_pins: bool,
}

impl Default for JawParams {
    fn default() -> Self {
        Self { thinning: 0.05, ear_pins: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ChinParams {
    /// Upward shift as a fraction of the nose-to-chin distance
    #[schemars(range(min = 0.0, max = 0.2))]
    pub lift: f32,
    /// Fraction of the distance to the midline each chin point moves
    #[schemars(range(min = 0.0, max = 0.3))]
    pub narrow: f32,
}

impl Default for ChinParams {
    fn default() -> Self {
        Self { lift: 0.03, narrow: 0.05 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CheekParams {
    pub blush_color: [u8; 3],
    /// Blush radius as a fraction of the distance between cheek centres
    pub radius_ratio: f32,
    /// Weight of the colour layer added to the skin
    pub blush_density: f32,
    pub blush_opacity: f32,
    pub blush_blur_radius: u32,
    pub blush_blur_sigma: f32,
    /// Highlight radius relative to the blush radius
    pub highlight_scale: f32,
    /// Upward offset of the highlight, relative to the blush radius
    pub highlight_lift: f32,
    /// Offset of the highlight toward the midline, relative to the blush radius
    pub highlight_inward: f32,
    pub highlight_amount: u8,
    pub highlight_opacity: f32,
    pub highlight_blur_radius: u32,
    pub highlight_blur_sigma: f32,
}

impl Default for CheekParams {
    fn default() -> Self {
        Self {
            blush_color: [200, 110, 130],
            radius_ratio: 0.18,
            blush_density: 0.4,
            blush_opacity: 0.25,
            blush_blur_radius: 30,
            blush_blur_sigma: 30.0,
            highlight_scale: 0.6,
            highlight_lift: 0.4,
            highlight_inward: 0.15,
            highlight_amount: 40,
            highlight_opacity: 0.2,
            highlight_blur_radius: 20,
            highlight_blur_sigma: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BeardParams {
    /// Downward shift of the nose-bottom edge of the moustache area
    pub nose_offset: i32,
    /// Growth of the nose and lip exclusion area
    pub exclusion_radius: u8,
    pub cleanup_radius: u8,
    pub smoothing_passes: u32,
    pub smoothing_radius: u32,
    pub smoothing_sigma: f32,
    /// Weight of the sampled skin colour in the fill
    pub skin_weight: f32,
    pub blur_radius: u32,
    pub blur_sigma: f32,
    pub padding: i32,
    /// Used when no skin sample lands on the image
    pub fallback_skin: [u8; 3],
}

impl Default for BeardParams {
    fn default() -> Self {
        Self {
            nose_offset: 5,
            exclusion_radius: 4,
            cleanup_radius: 2,
            smoothing_passes: 4,
            smoothing_radius: 4,
            smoothing_sigma: 80.0,
            skin_weight: 0.45,
            blur_radius: 15,
            blur_sigma: 10.0,
            padding: 20,
            fallback_skin: [150, 180, 200],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SkinParams {
    pub smoothing_radius: u32,
    pub sigma_color: f32,
    pub sigma_space: f32,
    /// Growth of the eye, brow and lip exclusion area
    pub exclusion_radius: u8,
    pub exclusion_iterations: u32,
    pub edge_softness: u32,
}

impl Default for SkinParams {
    fn default() -> Self {
        Self {
            smoothing_radius: 7,
            sigma_color: 80.0,
            sigma_space: 80.0,
            exclusion_radius: 2,
            exclusion_iterations: 2,
            edge_softness: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EyeParams {
    #[schemars(range(min = 1.0, max = 1.3))]
    pub scale: f32,
    pub padding: i32,
    pub mask_blur_radius: u32,
    pub mask_blur_sigma: f32,
    pub liner_color: [u8; 3],
    pub liner_thickness: f32,
    /// Wing end relative to the outer eye corner (outward, upward)
    pub wing: [f32; 2],
    pub wing_thickness: f32,
    pub lash_color: [u8; 3],
    pub lash_count: usize,
    pub lash_length: f32,
    pub lash_slant: f32,
    /// Weight of the painted layer against the bare eye
    pub makeup_opacity: f32,
}

impl Default for EyeParams {
    fn default() -> Self {
        Self {
            scale: 1.08,
            padding: 12,
            mask_blur_radius: 7,
            mask_blur_sigma: 5.0,
            liner_color: [20, 20, 20],
            liner_thickness: 2.0,
            wing: [12.0, 7.0],
            wing_thickness: 3.0,
            lash_color: [30, 30, 30],
            lash_count: 5,
            lash_length: 6.0,
            lash_slant: 3.0,
            makeup_opacity: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BrowParams {
    pub color: [u8; 3],
    /// Thickness at the nose end of the brow
    pub base_thickness: f32,
    /// Thickness floor at the temple end
    pub min_thickness: f32,
    /// Arch height as a fraction of the brow width
    pub arch_lift: f32,
    /// Upward shift of both brow ends
    pub end_lift: i32,
    pub curve_steps: usize,
    pub erase_radius: u8,
    pub erase_iterations: u32,
    pub opacity: f32,
}

impl Default for BrowParams {
    fn default() -> Self {
        Self {
            color: [15, 15, 20],
            base_thickness: 7.0,
            min_thickness: 2.0,
            arch_lift: 0.15,
            end_lift: 2,
            curve_steps: 20,
            erase_radius: 3,
            erase_iterations: 3,
            opacity: 0.85,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LipParams {
    #[schemars(range(min = 1.0, max = 1.4))]
    pub scale: f32,
    pub color: [u8; 3],
    /// Weight of the lipstick colour in the recolor
    pub color_ratio: f32,
    pub padding: i32,
    pub edge_softness: u32,
    /// Lips smaller than this in either direction are left alone
    pub min_size: i32,
}

impl Default for LipParams {
    fn default() -> Self {
        Self {
            scale: 1.15,
            color: [210, 50, 165],
            color_ratio: 0.3,
            padding: 2,
            edge_softness: 2,
            min_size: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HairParams {
    /// Hairstyle image on a near-grey background
    pub asset: Option<PathBuf>,
    /// Asset width as a multiple of the face width
    pub width_ratio: f32,
    /// Saturation (0-255) above which asset pixels count as hair
    pub saturation_threshold: u8,
    /// Height of the top strip the background colour is sampled from,
    /// as a fraction of the image height
    pub background_strip: f32,
    pub face_grow_radius: u8,
    pub face_core_radius: u8,
    pub face_core_iterations: u32,
    pub face_core_softness: u32,
}

impl Default for HairParams {
    fn default() -> Self {
        Self {
            asset: None,
            width_ratio: 2.5,
            saturation_threshold: 60,
            background_strip: 0.05,
            face_grow_radius: 2,
            face_core_radius: 12,
            face_core_iterations: 2,
            face_core_softness: 10,
        }
    }
}
