//! Implements the geometric shape factors of non-spherical precipitates

mod aspect_ratio;
mod morphology;
mod shape_factor;
pub use crate::shape::aspect_ratio::*;
pub use crate::shape::morphology::*;
pub use crate::shape::shape_factor::*;
