use super::{khachaturyan_energy, ElasticConstants, EshelbyTensor, Inclusion};
use crate::base::{mandel_vector, tensor_components, QuadratureParams, Result, TensorInput};
use crate::shape::{check_aspect_ratio, Morphology};
use russell_lab::{mat_inverse, mat_vec_mul, Matrix, Vector};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Defines how the elastic energy of an inclusion is evaluated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyMethod {
    /// Khachaturyan for cuboids and Eshelby otherwise
    Auto,

    /// Eshelby's equivalent inclusion method; cuboids are replaced by the ellipsoid with the same volume
    Eshelby,

    /// Khachaturyan's microelasticity theory (homogeneous modulus)
    Khachaturyan,
}

/// Holds the parameters of the strain energy calculations
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrainEnergyParams {
    /// Selects the evaluation method
    pub method: EnergyMethod,

    /// Holds the quadrature parameters
    pub quadrature: QuadratureParams,
}

impl StrainEnergyParams {
    /// Allocates a new instance with default values
    pub fn new() -> Self {
        StrainEnergyParams {
            method: EnergyMethod::Auto,
            quadrature: QuadratureParams::new(),
        }
    }

    /// Sets the evaluation method
    pub fn set_method(&mut self, method: EnergyMethod) -> Result<&mut Self> {
        self.method = method;
        Ok(self)
    }

    /// Sets the quadrature parameters
    pub fn set_quadrature(&mut self, quadrature: QuadratureParams) -> Result<&mut Self> {
        quadrature.validate()?;
        self.quadrature = quadrature;
        Ok(self)
    }
}

impl Default for StrainEnergyParams {
    fn default() -> Self {
        StrainEnergyParams::new()
    }
}

/// Defines the energy-density interface required by the aspect-ratio search
pub trait StrainEnergyModel {
    /// Returns the elastic energy per unit volume (J/m³) of a precipitate with the given morphology and aspect ratio
    ///
    /// The elastic energy of a uniformly transformed inclusion scales with its volume.
    fn energy_density(&self, morphology: Morphology, aspect_ratio: f64) -> Result<f64>;

    /// Returns a hash identifying all parameters that affect [StrainEnergyModel::energy_density]
    fn fingerprint(&self) -> u64;
}

/// Calculates the elastic strain energy of a misfitting precipitate
///
/// The total energy of an inclusion with volume V, eigenstrain ε*, and applied stress σᴬ is
///
/// ```text
///          V
/// E = - ─── σᴵ : ε*  -  V σᴬ : ε*
///          2
/// ```
///
/// where σᴵ is the stress inside the inclusion. With the Eshelby method, the equivalent
/// eigenstrain ε** of an inhomogeneous inclusion (stiffness Cₚ in a matrix Cₘ) solves
///
/// ```text
/// [Cₘ - (Cₘ - Cₚ) S] ε** = Cₚ ε*      εᶜ = S ε**      σᴵ = Cₚ (εᶜ - ε*)
/// ```
///
/// which reduces to `σᴵ = C (S ε* - ε*)` if the precipitate has the matrix stiffness.
/// The Khachaturyan method always assumes the matrix stiffness for the precipitate.
#[derive(Clone, Debug)]
pub struct StrainEnergy {
    /// Holds the stiffness of the matrix
    matrix: ElasticConstants,

    /// Holds the stiffness of the precipitate (None means the same as the matrix)
    precipitate: Option<ElasticConstants>,

    /// Holds the eigenstrain
    eigenstrain: [[f64; 3]; 3],

    /// Holds the applied stress
    external_stress: [[f64; 3]; 3],

    /// Holds the parameters
    params: StrainEnergyParams,
}

impl StrainEnergy {
    /// Allocates a new instance
    ///
    /// The eigenstrain is normalized to a symmetric tensor; see [TensorInput].
    pub fn new(matrix: ElasticConstants, eigenstrain: TensorInput, params: StrainEnergyParams) -> Result<Self> {
        params.quadrature.validate()?;
        let eps = eigenstrain.to_tensor()?;
        Ok(StrainEnergy {
            matrix,
            precipitate: None,
            eigenstrain: tensor_components(&eps),
            external_stress: [[0.0; 3]; 3],
            params,
        })
    }

    /// Sets the applied (external) stress
    pub fn with_external_stress(mut self, stress: TensorInput) -> Result<Self> {
        let sig = stress.to_tensor()?;
        self.external_stress = tensor_components(&sig);
        Ok(self)
    }

    /// Sets the stiffness of the precipitate (inhomogeneous inclusion)
    pub fn with_precipitate(mut self, precipitate: ElasticConstants) -> Self {
        self.precipitate = Some(precipitate);
        self
    }

    /// Returns the stiffness of the matrix
    pub fn matrix(&self) -> &ElasticConstants {
        &self.matrix
    }

    /// Returns the eigenstrain components
    pub fn eigenstrain(&self) -> &[[f64; 3]; 3] {
        &self.eigenstrain
    }

    /// Returns the parameters
    pub fn params(&self) -> &StrainEnergyParams {
        &self.params
    }

    /// Calculates the total elastic energy (J) of the inclusion
    pub fn strain_energy(&self, inclusion: &Inclusion) -> Result<f64> {
        inclusion.validate()?;
        let method = match (self.params.method, inclusion) {
            (EnergyMethod::Auto, Inclusion::Cuboid { .. }) => EnergyMethod::Khachaturyan,
            (EnergyMethod::Auto, Inclusion::Ellipsoid { .. }) => EnergyMethod::Eshelby,
            (method, _) => method,
        };
        let self_energy = match method {
            EnergyMethod::Khachaturyan => {
                khachaturyan_energy(&self.matrix, &self.eigenstrain, inclusion, &self.params.quadrature)?
            }
            _ => self.eshelby_energy(inclusion)?,
        };
        Ok(self_energy + self.interaction_energy(inclusion.volume()))
    }

    /// Calculates the total elastic energy (J) of a precipitate with given equivalent radius, morphology and aspect ratio
    pub fn strain_energy_of(&self, equivalent_radius: f64, morphology: Morphology, aspect_ratio: f64) -> Result<f64> {
        let inclusion = Inclusion::for_shape(equivalent_radius, morphology, aspect_ratio)?;
        self.strain_energy(&inclusion)
    }

    /// Calculates the Eshelby tensor of the (equivalent) ellipsoid
    pub fn eshelby_tensor(&self, inclusion: &Inclusion) -> Result<EshelbyTensor> {
        let semi_axes = inclusion.equivalent_ellipsoid();
        EshelbyTensor::new(&semi_axes, &self.matrix, &self.params.quadrature)
    }

    /// Calculates the stress inside the inclusion (without the applied stress) as a Mandel vector
    pub fn internal_stress(&self, inclusion: &Inclusion) -> Result<[f64; 6]> {
        let ss = self.eshelby_tensor(inclusion)?;
        let sm = ss.mandel();
        let eps = mandel_vector(&self.eigenstrain);
        let cm = self.matrix.mandel();
        let cp = match &self.precipitate {
            Some(p) => p.mandel(),
            None => cm,
        };
        // equivalent eigenstrain
        let eps_star_star = match &self.precipitate {
            None => eps,
            Some(_) => {
                let mut aa = Matrix::new(6, 6);
                let mut rhs = Vector::new(6);
                for i in 0..6 {
                    let mut b = 0.0;
                    for j in 0..6 {
                        let mut dcs = 0.0;
                        for k in 0..6 {
                            dcs += (cm[i][k] - cp[i][k]) * sm[k][j];
                        }
                        aa.set(i, j, cm[i][j] - dcs);
                        b += cp[i][j] * eps[j];
                    }
                    rhs[i] = b;
                }
                let mut ai = Matrix::new(6, 6);
                mat_inverse(&mut ai, &aa)?;
                let mut x = Vector::new(6);
                mat_vec_mul(&mut x, 1.0, &ai, &rhs)?;
                [x[0], x[1], x[2], x[3], x[4], x[5]]
            }
        };
        // σᴵ = Cₚ (S ε** - ε*)
        let mut sig = [0.0; 6];
        let mut diff = [0.0; 6];
        for i in 0..6 {
            let mut constrained = 0.0;
            for j in 0..6 {
                constrained += sm[i][j] * eps_star_star[j];
            }
            diff[i] = constrained - eps[i];
        }
        for i in 0..6 {
            for j in 0..6 {
                sig[i] += cp[i][j] * diff[j];
            }
        }
        Ok(sig)
    }

    /// Calculates the self energy with the Eshelby method
    fn eshelby_energy(&self, inclusion: &Inclusion) -> Result<f64> {
        let sig = self.internal_stress(inclusion)?;
        let eps = mandel_vector(&self.eigenstrain);
        let dot: f64 = sig.iter().zip(eps.iter()).map(|(s, e)| s * e).sum();
        Ok(-0.5 * inclusion.volume() * dot)
    }

    /// Calculates the interaction energy with the applied stress: -V σᴬ : ε*
    fn interaction_energy(&self, volume: f64) -> f64 {
        let mut res = 0.0;
        for i in 0..3 {
            for j in 0..3 {
                res += self.external_stress[i][j] * self.eigenstrain[i][j];
            }
        }
        -volume * res
    }
}

impl StrainEnergyModel for StrainEnergy {
    fn energy_density(&self, morphology: Morphology, aspect_ratio: f64) -> Result<f64> {
        check_aspect_ratio(aspect_ratio)?;
        // the energy is proportional to the volume; the unit sphere keeps the numbers well scaled
        let inclusion = Inclusion::for_shape(1.0, morphology, aspect_ratio)?;
        Ok(self.strain_energy(&inclusion)? / inclusion.volume())
    }

    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.matrix.hash_bits(&mut hasher);
        match &self.precipitate {
            Some(p) => {
                hasher.write_u8(1);
                p.hash_bits(&mut hasher);
            }
            None => hasher.write_u8(0),
        }
        for row in self.eigenstrain.iter().chain(self.external_stress.iter()) {
            for v in row {
                hasher.write_u64(v.to_bits());
            }
        }
        self.params.method.hash(&mut hasher);
        let q = &self.params.quadrature;
        for n in [q.panel_order, q.grading_levels, q.n_azimuth, q.cubed_sphere_order] {
            hasher.write_usize(n);
        }
        hasher.finish()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
