//! # Region Mask and Compositing Library
//!
//! Soft single-channel region masks built from landmark geometry, and the
//! compositing operations that apply colour and texture edits through them.
//!
//! ## Core Features
//!
//! - **Mask Builder**: exact polygon, convex hull, ellipse, disc and stroke masks
//! - **Refinement**: grow/shrink/open/close morphology and Gaussian softening,
//!   composable through the [`MaskOp`] trait
//! - **Compositing**: weighted blend, flat recolor, patch paste with symmetric
//!   clipping, gradient-domain cloning with a paste fallback
//! - **Filters**: edge-preserving bilateral smoothing and diffusion fill
//!
//! ## Quick Start
//!
//! ```rust
//! use image::{Rgb, RgbImage};
//! use mask::{composite, RegionMask};
//!
//! let image = RgbImage::from_pixel(64, 64, Rgb([120, 100, 90]));
//! let lips = RegionMask::polygon_region(64, 64, &[[20, 30], [44, 30], [40, 40], [24, 40]])
//!     .soften(2);
//!
//! let painted = composite::recolor(&image, &lips, Rgb([210, 50, 165]), 0.3)?;
//! assert_eq!(painted.dimensions(), image.dimensions());
//! # Ok::<(), mask::MaskError>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod builder;
pub mod composite;

// Re-exports for convenience
pub use error::{MaskError, Result};
pub use types::{MaskBuffer, RegionMask};
pub use traits::*;
pub use algorithms::*;
pub use composite::Placement;

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_exclusion_halo_is_cut_from_region() {
        let region = RegionMask::polygon_region(80, 80, &[[10, 10], [70, 10], [70, 70], [10, 70]]);
        let hole = RegionMask::from_circle(80, 80, [40, 40], 8).grow(2, 1);
        let ring = region.subtract(&hole).expect("Same size");

        assert_eq!(ring.value(40, 40), 0.0);
        assert_eq!(ring.value(40, 31), 0.0);
        assert_eq!(ring.value(40, 28), 1.0);
        assert_eq!(ring.value(15, 15), 1.0);
    }

    #[test]
    fn test_soft_recolor_stays_inside_padded_box() {
        let image = RgbImage::from_pixel(60, 60, Rgb([100, 100, 100]));
        let mask = RegionMask::from_circle(60, 60, [30, 30], 6);
        let bbox = mask.bounding_box(0).expect("Not empty");
        let soft = mask.soften(5);
        let out = composite::recolor(&image, &soft, Rgb([255, 0, 0]), 1.0).expect("Same size");

        for (x, y, pixel) in out.enumerate_pixels() {
            if !bbox.padded_within(5, 60, 60).unwrap().contains(x as i32, y as i32) {
                assert_eq!(pixel, &Rgb([100, 100, 100]));
            }
        }
        assert!(out.get_pixel(30, 30)[0] >= 250);
    }
}
