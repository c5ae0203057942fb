//! Alpha compositing: weighted blends, patch placement with symmetric
//! clipping, and gradient-domain cloning.
//!
//! Every operation returns a new buffer; inputs are never written.

pub mod blend;
pub mod clone;
pub mod color;
pub mod placement;

pub use blend::*;
pub use clone::*;
pub use color::*;
pub use placement::*;
