//! Implements the base structures: errors, constants, tensor input, quadrature rules, and configuration

mod config;
mod constants;
mod error;
mod quadrature;
mod samples;
mod tensor_input;
pub use crate::base::config::*;
pub use crate::base::constants::*;
pub use crate::base::error::*;
pub use crate::base::quadrature::*;
pub use crate::base::samples::*;
pub use crate::base::tensor_input::*;
