//! Implements the search for the equilibrium aspect ratio of needles and plates

mod aspect_ratio_solver;
mod cache;
mod golden_section;
mod params;
pub use crate::solver::aspect_ratio_solver::*;
pub use crate::solver::cache::*;
pub use crate::solver::golden_section::*;
pub use crate::solver::params::*;
