use std::path::PathBuf;

use face_common::LandmarkError;
use mask::MaskError;
use mesh_warp::WarpError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};
use thiserror::Error;

use crate::stage::StageKind;

/// Failure inside a single stage
#[derive(Error, Debug)]
pub enum StageError {
    #[error("Degenerate geometry: {0}")]
    Degenerate(String),

    #[error(transparent)]
    Mask(#[from] MaskError),

    #[error(transparent)]
    Warp(#[from] WarpError),

    #[error("Stage changed the image size from {expected:?} to {actual:?}")]
    Dimensions { expected: (u32, u32), actual: (u32, u32) },
}

impl StageError {
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::Degenerate(reason.into())
    }

    /// Degenerate geometry and off-canvas placement leave the region as it
    /// was; everything else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Degenerate(_) => true,
            Self::Mask(e) => e.is_recoverable(),
            Self::Warp(WarpError::TooFewControlPoints(_)) => true,
            Self::Warp(_) => false,
            Self::Dimensions { .. } => false,
        }
    }
}

pub type StageResult<T> = std::result::Result<T, StageError>;

/// Machine-readable error category for presentation layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Input,
    NoFaceDetected,
    Landmarks,
    Stage,
    Asset,
    Output,
    Config,
}

#[derive(Error, Debug)]
pub enum FeminizeError {
    #[error("Failed to read input image: {0}")]
    Input(#[source] image::ImageError),

    #[error("No face detected")]
    NoFaceDetected,

    #[error("Landmark provider failed: {0}")]
    Landmarks(#[from] LandmarkError),

    #[error("Stage '{stage}' failed: {source}")]
    Stage { stage: StageKind, source: StageError },

    #[error("Failed to load hairstyle asset {}: {source}", .path.display())]
    Asset { path: PathBuf, source: image::ImageError },

    #[error("Failed to write image: {0}")]
    Output(#[source] image::ImageError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl FeminizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input(_) => ErrorKind::Input,
            Self::NoFaceDetected => ErrorKind::NoFaceDetected,
            Self::Landmarks(_) => ErrorKind::Landmarks,
            Self::Stage { .. } => ErrorKind::Stage,
            Self::Asset { .. } => ErrorKind::Asset,
            Self::Output(_) => ErrorKind::Output,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// The stage that aborted the run, if any
    pub fn stage(&self) -> Option<StageKind> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FeminizeError>;
