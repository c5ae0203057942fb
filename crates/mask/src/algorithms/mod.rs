pub mod morphology;
pub mod blur;
pub mod filter;
pub mod fill;

pub use morphology::*;
pub use blur::*;
pub use filter::*;
pub use fill::*;
