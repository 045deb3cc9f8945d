//! Makes available common structures needed to compute precipitate shapes
//!
//! You may write `use kwnshape::prelude::*` in your code and obtain
//! access to commonly used functionality.

pub use crate::base::{Error, KwnShapeConfig, MaterialInput, QuadratureParams, Samples, TensorInput};
pub use crate::elasticity::{
    ElasticConstants, ElasticModuli, EnergyMethod, EshelbyTensor, Inclusion, StrainEnergy, StrainEnergyModel,
    StrainEnergyParams,
};
pub use crate::shape::{AspectRatio, Morphology, ShapeFactor};
pub use crate::solver::{AspectRatioCache, AspectRatioSolver, SearchMethod, ShapeState, SolverParams};
