//! Implements the elastic stiffness, the Eshelby tensor, and the strain energy of inclusions

mod elastic_constants;
mod elastic_moduli;
mod eshelby;
mod inclusion;
mod khachaturyan;
mod strain_energy;
pub use crate::elasticity::elastic_constants::*;
pub use crate::elasticity::elastic_moduli::*;
pub use crate::elasticity::eshelby::*;
pub use crate::elasticity::inclusion::*;
pub use crate::elasticity::khachaturyan::*;
pub use crate::elasticity::strain_energy::*;
