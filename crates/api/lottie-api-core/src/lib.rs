//! lottie-api-core: strongly typed boundary values (renderer-agnostic)

pub mod color;
pub mod keypath;

pub use color::{ColorError, Rgba};
pub use keypath::{KeyPath, Segment, COLOR_PROPERTY};
