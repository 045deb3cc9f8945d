//! Shape factors, inclusion strain energy, and equilibrium aspect ratios for KWN precipitation models
//!
//! The crate provides the shape-dependent corrections required by a Kampmann-Wagner numerical
//! (KWN) model of non-spherical precipitates:
//!
//! * [elasticity] -- elastic constants, Eshelby tensor, and strain energy of misfitting inclusions
//! * [shape] -- morphologies, aspect ratios, and the Gibbs-Thomson and growth-rate corrections
//! * [solver] -- equilibrium aspect ratio minimizing the elastic plus interfacial energies
//! * [base] -- errors, tensor input, quadrature rules, sample systems, and configuration
//!
//! # Example
//!
//! ```
//! use kwnshape::prelude::*;
//!
//! fn main() -> Result<(), Error> {
//!     let config = Samples::in718_gamma_double_prime();
//!     let model = config.strain_energy()?;
//!     let solver = config.solver()?;
//!     let alpha = solver.equilibrium_aspect_ratio(5e-9, config.interfacial_energy, config.morphology, &model)?;
//!     assert!(alpha > 1.0);
//!     Ok(())
//! }
//! ```

pub mod base;
pub mod elasticity;
pub mod prelude;
pub mod shape;
pub mod solver;
