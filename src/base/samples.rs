use super::{KwnShapeConfig, MaterialInput, TensorInput};
use crate::elasticity::ElasticModuli;
use crate::shape::Morphology;

/// Holds some sample precipitation systems (SI units)
pub struct Samples;

impl Samples {
    /// Returns Cu₄Ti needles in a Cu matrix
    ///
    /// Cubic stiffness of Cu and the tetragonal misfit of Cu₄Ti. The interfacial energy is a
    /// representative value.
    pub fn cu_cu4ti() -> KwnShapeConfig {
        KwnShapeConfig::new(
            MaterialInput::Cubic {
                c11: 168.4e9, // Pa
                c12: 121.4e9, // Pa
                c44: 75.4e9,  // Pa
            },
            TensorInput::Diagonal([0.022, 0.022, 0.003]),
            Morphology::Needle,
            0.035, // J/m²
        )
    }

    /// Returns γ″ (Ni₃Nb) plates in an IN718 matrix
    ///
    /// Isotropic matrix and the large misfit along the c axis (normal to the plates).
    pub fn in718_gamma_double_prime() -> KwnShapeConfig {
        KwnShapeConfig::new(
            MaterialInput::Moduli(ElasticModuli::shear_poisson(57.1e9, 0.33)),
            TensorInput::Diagonal([6.67e-3, 6.67e-3, 2.86e-2]),
            Morphology::Plate,
            0.02375, // J/m²
        )
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
