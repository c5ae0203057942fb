use thiserror::Error;

#[derive(Error, Debug)]
pub enum MaskError {
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Region is empty: {0}")]
    EmptyRegion(String),

    #[error("Patch {width}x{height} at ({x}, {y}) lies entirely outside the canvas")]
    PatchOutOfBounds { x: i32, y: i32, width: u32, height: u32 },

    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch { expected: (u32, u32), actual: (u32, u32) },

    #[error("Gradient-domain clone cannot anchor: {0}")]
    CloneAnchor(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),
}

impl MaskError {
    /// Degenerate geometry and off-canvas placement leave pixels untouched
    /// instead of failing the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::EmptyRegion(_) | Self::PatchOutOfBounds { .. } | Self::CloneAnchor(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MaskError>;
