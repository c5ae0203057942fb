//! # Face Common - Shared Landmark Types and Utilities
//!
//! Foundational types shared by the mask, warp and feminize crates: the
//! 478-point [`LandmarkSet`], the named [`Region`] registry that maps facial
//! areas to landmark indices, and the [`LandmarkProvider`] seam behind which
//! the external detector lives.
//!
//! ## Example
//!
//! ```rust
//! use face_common::{LandmarkSet, Region, LANDMARK_COUNT};
//!
//! let points = vec![[100, 120]; LANDMARK_COUNT];
//! let landmarks = LandmarkSet::new(points).unwrap();
//!
//! let lips = landmarks.region(Region::LipsOuter);
//! assert_eq!(lips.len(), Region::LipsOuter.indices().len());
//! ```

use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use thiserror::Error;

pub mod regions;
pub mod provider;
#[cfg(any(test, feature = "synthetic"))]
pub mod synthetic;

// Re-exports for convenience
pub use regions::{landmark, Region};
pub use provider::{JsonLandmarkProvider, LandmarkProvider, LandmarkPayload};

/// Number of points produced by the refined face mesh (mesh + iris).
pub const LANDMARK_COUNT: usize = 478;

/// Number of mesh points without the iris refinement.
pub const MESH_COUNT: usize = 468;

/// Result type for landmark operations
pub type Result<T> = std::result::Result<T, LandmarkError>;

/// Standard error type for landmark operations
#[derive(Error, Debug)]
pub enum LandmarkError {
    #[error("Expected {expected} landmarks, got {actual}")]
    WrongCount { expected: usize, actual: usize },

    #[error("Landmark index {index} out of range")]
    IndexOutOfRange { index: usize },

    #[error("Invalid landmark payload: {message}")]
    InvalidPayload { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Axis-aligned integer rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    /// Create a new rectangle
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Smallest rectangle containing every point, inclusive of the extreme pixels
    pub fn enclosing(points: &[[i32; 2]]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first[0], first[1], first[0], first[1]);
        for &[x, y] in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }

    /// Grow by `padding` on every side, then clip to a `width` x `height` canvas
    pub fn padded_within(&self, padding: i32, width: u32, height: u32) -> Option<Self> {
        let x0 = (self.x - padding).max(0);
        let y0 = (self.y - padding).max(0);
        let x1 = (self.x + self.width + padding).min(width as i32);
        let y1 = (self.y + self.height + padding).min(height as i32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// Integer center, rounding toward the top-left
    pub fn center(&self) -> [i32; 2] {
        [self.x + self.width / 2, self.y + self.height / 2]
    }

    /// Right edge (exclusive)
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive)
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Check if a pixel is inside this rectangle
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }
}

/// Ordered, immutable set of exactly [`LANDMARK_COUNT`] pixel coordinates.
///
/// There is no mutating API: a set is produced once per run by the provider
/// and shared read-only with every stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[i32; 2]>", into = "Vec<[i32; 2]>")]
pub struct LandmarkSet {
    points: Vec<[i32; 2]>,
}

impl LandmarkSet {
    /// Create a landmark set, rejecting anything but a complete mesh
    pub fn new(points: Vec<[i32; 2]>) -> Result<Self> {
        if points.len() != LANDMARK_COUNT {
            return Err(LandmarkError::WrongCount {
                expected: LANDMARK_COUNT,
                actual: points.len(),
            });
        }
        Ok(Self { points })
    }

    /// Convert detector output in `[0, 1]` image units to pixels.
    ///
    /// Coordinates are truncated, so points slightly outside the frame stay
    /// outside it.
    pub fn from_normalized(points: &[[f32; 2]], width: u32, height: u32) -> Result<Self> {
        let pixels = points
            .iter()
            .map(|&[x, y]| [(x * width as f32) as i32, (y * height as f32) as i32])
            .collect();
        Self::new(pixels)
    }

    /// Get a single landmark. Panics on an index outside the mesh, which is a
    /// registry bug rather than a data error.
    pub fn point(&self, index: usize) -> [i32; 2] {
        self.points[index]
    }

    /// Checked variant of [`LandmarkSet::point`]
    pub fn get(&self, index: usize) -> Result<[i32; 2]> {
        self.points
            .get(index)
            .copied()
            .ok_or(LandmarkError::IndexOutOfRange { index })
    }

    /// Landmarks for an explicit index list, in list order
    pub fn points(&self, indices: &[usize]) -> Vec<[i32; 2]> {
        indices.iter().map(|&i| self.points[i]).collect()
    }

    /// Landmarks of a named region, in registry order
    pub fn region(&self, region: Region) -> Vec<[i32; 2]> {
        self.points(region.indices())
    }

    /// Bounding rectangle of the given indices
    pub fn bounding_rect(&self, indices: &[usize]) -> Option<PixelRect> {
        PixelRect::enclosing(&self.points(indices))
    }

    /// Bounding rectangle of the first `limit` landmarks
    pub fn leading_bounding_rect(&self, limit: usize) -> Option<PixelRect> {
        PixelRect::enclosing(&self.points[..limit.min(self.points.len())])
    }

    pub fn as_slice(&self) -> &[[i32; 2]] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl TryFrom<Vec<[i32; 2]>> for LandmarkSet {
    type Error = LandmarkError;

    fn try_from(points: Vec<[i32; 2]>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<LandmarkSet> for Vec<[i32; 2]> {
    fn from(set: LandmarkSet) -> Self {
        set.points
    }
}

/// Euclidean distance between two pixel coordinates
pub fn distance(a: [i32; 2], b: [i32; 2]) -> f32 {
    let dx = (a[0] - b[0]) as f32;
    let dy = (a[1] - b[1]) as f32;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_count_is_enforced() {
        assert!(LandmarkSet::new(vec![[0, 0]; LANDMARK_COUNT]).is_ok());

        let err = LandmarkSet::new(vec![[0, 0]; 468]).unwrap_err();
        assert!(matches!(err, LandmarkError::WrongCount { expected: 478, actual: 468 }));
    }

    #[test]
    fn test_serde_validates_count() {
        let json = serde_json::to_string(&vec![[1, 2]; LANDMARK_COUNT]).unwrap();
        let set: LandmarkSet = serde_json::from_str(&json).expect("Should parse full set");
        assert_eq!(set.point(477), [1, 2]);

        let short = serde_json::to_string(&vec![[1, 2]; 10]).unwrap();
        assert!(serde_json::from_str::<LandmarkSet>(&short).is_err());
    }

    #[test]
    fn test_from_normalized_truncates() {
        let points = vec![[0.5, 0.25]; LANDMARK_COUNT];
        let set = LandmarkSet::from_normalized(&points, 201, 101).unwrap();
        assert_eq!(set.point(0), [100, 25]);
    }

    #[test]
    fn test_bounding_rect_is_inclusive() {
        let rect = PixelRect::enclosing(&[[10, 20], [19, 24]]).unwrap();
        assert_eq!(rect, PixelRect::new(10, 20, 10, 5));
        assert!(rect.contains(19, 24));
        assert!(!rect.contains(20, 24));
        assert!(PixelRect::enclosing(&[]).is_none());
    }

    #[test]
    fn test_padded_within_clips_to_canvas() {
        let rect = PixelRect::new(5, 5, 10, 10);
        let padded = rect.padded_within(20, 100, 30).unwrap();
        assert_eq!(padded, PixelRect::new(0, 0, 35, 30));

        let outside = PixelRect::new(200, 200, 5, 5);
        assert!(outside.padded_within(2, 100, 100).is_none());
    }

    #[test]
    fn test_distance() {
        assert!((distance([0, 0], [3, 4]) - 5.0).abs() < 1e-6);
    }
}
