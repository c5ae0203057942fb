use crate::types::RegionMask;

/// A single refinement step applied to a region mask (grow, shrink, soften, ...)
pub trait MaskOp: Send + Sync {
    /// Produce the refined mask; the input is never modified
    fn apply(&self, mask: &RegionMask) -> RegionMask;
}

impl RegionMask {
    /// Run a sequence of refinement steps in order
    pub fn refine(&self, ops: &[&dyn MaskOp]) -> RegionMask {
        ops.iter().fold(self.clone(), |mask, op| op.apply(&mask))
    }
}
