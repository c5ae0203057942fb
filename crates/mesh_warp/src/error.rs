use thiserror::Error;

#[derive(Error, Debug)]
pub enum WarpError {
    #[error("Need at least 3 control points, got {0}")]
    TooFewControlPoints(usize),

    #[error("Triangulation failed: {0}")]
    Triangulation(String),
}

pub type Result<T> = std::result::Result<T, WarpError>;
