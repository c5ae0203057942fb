use std::{fs, path::{Path, PathBuf}};

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{LandmarkError, LandmarkSet, Result};

/// Source of facial landmarks for a whole image.
///
/// Implementations either return a complete [`LandmarkSet`] or `Ok(None)`
/// when no face is present; partial sets are never produced. A provider may
/// hold an expensive model, so callers construct it once and pass the handle
/// to whatever drives the pipeline.
pub trait LandmarkProvider {
    fn detect(&mut self, image: &RgbImage) -> Result<Option<LandmarkSet>>;
}

impl<P: LandmarkProvider + ?Sized> LandmarkProvider for Box<P> {
    fn detect(&mut self, image: &RgbImage) -> Result<Option<LandmarkSet>> {
        (**self).detect(image)
    }
}

/// On-disk landmark document written by an external detector
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LandmarkPayload {
    /// Bare list of pixel coordinates
    Pixels(Vec<[i32; 2]>),
    /// Tagged document, optionally in normalized image units
    Document {
        #[serde(default)]
        normalized: bool,
        points: Vec<[f32; 2]>,
    },
}

impl LandmarkPayload {
    /// Resolve the payload against the image it was detected on
    pub fn into_landmarks(self, width: u32, height: u32) -> Result<Option<LandmarkSet>> {
        match self {
            Self::Pixels(points) if points.is_empty() => Ok(None),
            Self::Pixels(points) => LandmarkSet::new(points).map(Some),
            Self::Document { points, .. } if points.is_empty() => Ok(None),
            Self::Document { normalized: true, points } => {
                LandmarkSet::from_normalized(&points, width, height).map(Some)
            }
            Self::Document { normalized: false, points } => {
                let pixels = points
                    .iter()
                    .map(|&[x, y]| [x as i32, y as i32])
                    .collect();
                LandmarkSet::new(pixels).map(Some)
            }
        }
    }
}

/// Provider backed by a sidecar JSON file produced by a detector
#[derive(Debug, Clone)]
pub struct JsonLandmarkProvider {
    path: PathBuf,
}

impl JsonLandmarkProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a landmark document; `null` means no face was found
    pub fn parse(content: &str, width: u32, height: u32) -> Result<Option<LandmarkSet>> {
        let payload: Option<LandmarkPayload> = serde_json::from_str(content)
            .map_err(|e| LandmarkError::InvalidPayload { message: e.to_string() })?;
        match payload {
            Some(payload) => payload.into_landmarks(width, height),
            None => Ok(None),
        }
    }
}

impl LandmarkProvider for JsonLandmarkProvider {
    fn detect(&mut self, image: &RgbImage) -> Result<Option<LandmarkSet>> {
        debug!("Reading landmarks from {}", self.path.display());
        let content = fs::read_to_string(&self.path)?;
        Self::parse(&content, image.width(), image.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LANDMARK_COUNT;

    #[test]
    fn test_parse_pixel_array() {
        let json = serde_json::to_string(&vec![[12, 34]; LANDMARK_COUNT]).unwrap();
        let set = JsonLandmarkProvider::parse(&json, 100, 100)
            .expect("Should parse")
            .expect("Should contain a face");
        assert_eq!(set.point(10), [12, 34]);
    }

    #[test]
    fn test_parse_normalized_document() {
        let doc = serde_json::json!({
            "normalized": true,
            "points": vec![[0.5, 0.5]; LANDMARK_COUNT],
        });
        let set = JsonLandmarkProvider::parse(&doc.to_string(), 200, 100)
            .expect("Should parse")
            .expect("Should contain a face");
        assert_eq!(set.point(0), [100, 50]);
    }

    #[test]
    fn test_no_face_signals() {
        for doc in ["null", "[]", r#"{"points": []}"#] {
            let parsed = JsonLandmarkProvider::parse(doc, 10, 10).expect("Should parse");
            assert!(parsed.is_none(), "{doc} should mean no face");
        }
    }

    #[test]
    fn test_partial_set_is_rejected() {
        let json = serde_json::to_string(&vec![[1, 1]; 100]).unwrap();
        assert!(JsonLandmarkProvider::parse(&json, 10, 10).is_err());
    }
}
