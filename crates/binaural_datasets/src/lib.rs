mod direction;
mod error;
mod hrtf;
mod loader;

pub use direction::*;
pub use error::*;
pub use hrtf::*;
