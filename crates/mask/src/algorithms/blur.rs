use imageproc::filter::separable_filter_equal;

use crate::{traits::MaskOp, types::RegionMask};

/// Normalized Gaussian kernel of length `2 * radius + 1`.
///
/// A non-positive `sigma` derives one from the kernel size the way OpenCV
/// does for `GaussianBlur` with `sigma = 0`.
pub fn gaussian_kernel(radius: u32, sigma: f32) -> Vec<f32> {
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * (radius as f32 - 1.0) + 0.8
    };
    let r = radius as i32;
    let mut kernel: Vec<f32> = (-r..=r)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Gaussian softening with a hard support of `radius` pixels, so the
/// footprint of a mask grows by at most `radius` in every direction.
#[derive(Debug, Clone, Copy)]
pub struct Soften {
    pub radius: u32,
    pub sigma: f32,
}

impl MaskOp for Soften {
    fn apply(&self, mask: &RegionMask) -> RegionMask {
        if self.radius == 0 {
            return mask.clone();
        }
        let kernel = gaussian_kernel(self.radius, self.sigma);
        RegionMask::from_buffer(separable_filter_equal(mask.buffer(), &kernel))
    }
}

impl RegionMask {
    /// Blur edges into a `[0, 1]` gradient, sigma derived from the radius
    pub fn soften(&self, radius: u32) -> RegionMask {
        Soften { radius, sigma: 0.0 }.apply(self)
    }

    /// Blur with an explicit sigma
    pub fn soften_sigma(&self, radius: u32, sigma: f32) -> RegionMask {
        Soften { radius, sigma }.apply(self)
    }
}
