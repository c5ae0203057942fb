use imageproc::{distance_transform::Norm, morphology};

use crate::{traits::MaskOp, types::RegionMask};

/// Dilation by a square structuring element of side `2 * radius + 1`,
/// repeated `iterations` times. The result is binary.
#[derive(Debug, Clone, Copy)]
pub struct Grow {
    pub radius: u8,
    pub iterations: u32,
}

impl MaskOp for Grow {
    fn apply(&self, mask: &RegionMask) -> RegionMask {
        let mut binary = mask.to_binary();
        for _ in 0..self.iterations {
            binary = morphology::dilate(&binary, Norm::LInf, self.radius);
        }
        RegionMask::from_binary(&binary)
    }
}

/// Erosion by a square structuring element, the inverse of [`Grow`]
#[derive(Debug, Clone, Copy)]
pub struct Shrink {
    pub radius: u8,
    pub iterations: u32,
}

impl MaskOp for Shrink {
    fn apply(&self, mask: &RegionMask) -> RegionMask {
        let mut binary = mask.to_binary();
        for _ in 0..self.iterations {
            binary = morphology::erode(&binary, Norm::LInf, self.radius);
        }
        RegionMask::from_binary(&binary)
    }
}

/// Erode then dilate: removes specks thinner than the element
#[derive(Debug, Clone, Copy)]
pub struct Open {
    pub radius: u8,
    pub iterations: u32,
}

impl MaskOp for Open {
    fn apply(&self, mask: &RegionMask) -> RegionMask {
        let shrunk = Shrink { radius: self.radius, iterations: self.iterations }.apply(mask);
        Grow { radius: self.radius, iterations: self.iterations }.apply(&shrunk)
    }
}

/// Dilate then erode: fills gaps narrower than the element
#[derive(Debug, Clone, Copy)]
pub struct Close {
    pub radius: u8,
    pub iterations: u32,
}

impl MaskOp for Close {
    fn apply(&self, mask: &RegionMask) -> RegionMask {
        let grown = Grow { radius: self.radius, iterations: self.iterations }.apply(mask);
        Shrink { radius: self.radius, iterations: self.iterations }.apply(&grown)
    }
}

impl RegionMask {
    /// Inclusion halo: dilate `iterations` times by `radius`
    pub fn grow(&self, radius: u8, iterations: u32) -> RegionMask {
        Grow { radius, iterations }.apply(self)
    }

    /// Exclusion halo: erode `iterations` times by `radius`
    pub fn shrink(&self, radius: u8, iterations: u32) -> RegionMask {
        Shrink { radius, iterations }.apply(self)
    }

    pub fn open(&self, radius: u8, iterations: u32) -> RegionMask {
        Open { radius, iterations }.apply(self)
    }

    pub fn close(&self, radius: u8, iterations: u32) -> RegionMask {
        Close { radius, iterations }.apply(self)
    }
}
