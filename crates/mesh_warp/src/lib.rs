//! # Triangulated Mesh Warp
//!
//! Deforms an image by moving a sparse set of control points. The control
//! points are triangulated (Delaunay) at their source positions, and every
//! triangle is mapped affinely onto the triangle formed by the same points'
//! target positions.
//!
//! Each [`ControlSet`] carries the canvas corners and edge midpoints as
//! fixed anchors, so the image border never tears.
//!
//! ```rust
//! use image::RgbImage;
//! use mesh_warp::{warp, ControlSet};
//!
//! let image = RgbImage::new(64, 64);
//! let mut controls = ControlSet::new(64, 64);
//! controls.push_moving([32.0, 40.0], [30.0, 40.0]);
//! controls.push_anchor([32.0, 20.0]);
//!
//! let warped = warp(&image, &controls)?;
//! assert_eq!(warped.dimensions(), (64, 64));
//! # Ok::<(), mesh_warp::WarpError>(())
//! ```

pub mod affine;
pub mod control;
pub mod delaunay;
pub mod engine;
pub mod error;

pub use control::{canvas_anchors, ControlPoint, ControlSet};
pub use engine::{warp, warp_with_stats, WarpStats};
pub use error::{Result, WarpError};
