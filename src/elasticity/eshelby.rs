use super::{inverse_3x3, ElasticConstants};
use crate::base::{mandel_weight, voigt_index, Error, QuadratureParams, Result, SphereRule, AXES_TOLERANCE};
use crate::base::{mandel_vector, mandel_to_matrix, tensor_components, NEAR_SPHERE_BAND, VOIGT_PAIRS};
use russell_lab::{mat_inverse, Matrix};
use russell_tensor::{Mandel, Tensor2};

/// Holds the components of a fourth-order tensor
pub(crate) type Tensor4Array = [[[[f64; 3]; 3]; 3]; 3];

/// Indicates how the Eshelby tensor was evaluated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EshelbyEvaluation {
    /// Closed form for a sphere in an isotropic matrix
    Sphere,

    /// Closed form for a spheroid (two equal semi-axes) in an isotropic matrix
    Spheroid,

    /// Numerical quadrature of the Green's function over the unit sphere
    Quadrature,
}

/// Holds the Eshelby tensor S and the Hill polarization tensor P of an ellipsoidal inclusion
///
/// The two tensors are related by `S = P : C` where C is the stiffness of the matrix.
/// The polarization tensor is the orientation average of the Green's function kernel:
///
/// ```text
///       1   ⌠                                          ζᵢ
/// P = ───── │  Γ(ξ(ζ)) dS(ζ)      with    ξᵢ(ζ) = ───
///      4π   ⌡|ζ|=1                                     aᵢ
///
/// Γᵢⱼₖₗ(ξ) = sym{ ξⱼ K⁻¹ᵢₖ(ξ) ξₗ }       Kᵢₖ(ξ) = Cᵢⱼₖₗ ξⱼ ξₗ
/// ```
///
/// where `sym{}` averages over the minor symmetries (i ↔ j and k ↔ l).
///
/// For isotropic matrices, closed-form expressions are used for the sphere and, away from
/// the sphere limit, for spheroids with any unique axis (Mura, Micromechanics of defects
/// in solids, 1987).
#[derive(Clone, Debug)]
pub struct EshelbyTensor {
    /// Holds the semi-axes
    semi_axes: [f64; 3],

    /// Holds the Eshelby tensor components
    ss: Tensor4Array,

    /// Holds the Hill polarization tensor components
    pp: Tensor4Array,

    /// Indicates which algorithm was used
    evaluation: EshelbyEvaluation,
}

impl EshelbyTensor {
    /// Computes the Eshelby tensor of an ellipsoid embedded in a matrix with the given stiffness
    ///
    /// # Input
    ///
    /// * `semi_axes` -- the semi-axes (a₁, a₂, a₃) along the coordinate axes; all must be > 0
    /// * `matrix` -- the stiffness of the matrix
    /// * `params` -- the quadrature parameters (used whenever no closed form applies)
    pub fn new(semi_axes: &[f64; 3], matrix: &ElasticConstants, params: &QuadratureParams) -> Result<Self> {
        for a in semi_axes {
            if !a.is_finite() || *a <= 0.0 {
                return Err(Error::InvalidInput(format!(
                    "semi-axes must be finite and > 0 (got {:?})",
                    semi_axes
                )));
            }
        }
        params.validate()?;
        if let Some((lambda, mu)) = matrix.isotropic_lame() {
            let nu = lambda / (2.0 * (lambda + mu));
            if let Some((unique, rho)) = spheroid_ratio(semi_axes) {
                if rho == 1.0 {
                    let ss = sphere_eshelby(nu);
                    return EshelbyTensor::from_eshelby(semi_axes, ss, matrix, EshelbyEvaluation::Sphere);
                }
                if f64::abs(rho - 1.0) >= NEAR_SPHERE_BAND {
                    let ss = spheroid_eshelby(unique, rho, nu);
                    return EshelbyTensor::from_eshelby(semi_axes, ss, matrix, EshelbyEvaluation::Spheroid);
                }
            }
        }
        EshelbyTensor::from_quadrature(semi_axes, matrix, params)
    }

    /// Returns the semi-axes
    pub fn semi_axes(&self) -> &[f64; 3] {
        &self.semi_axes
    }

    /// Returns the component Sᵢⱼₖₗ of the Eshelby tensor
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        self.ss[i][j][k][l]
    }

    /// Returns the component Pᵢⱼₖₗ of the Hill polarization tensor
    #[inline]
    pub fn polarization(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        self.pp[i][j][k][l]
    }

    /// Returns the algorithm used to compute the tensor
    pub fn evaluation(&self) -> EshelbyEvaluation {
        self.evaluation
    }

    /// Returns the Eshelby tensor in the Mandel basis
    ///
    /// The 6×6 matrix maps Mandel vectors of strain onto Mandel vectors of strain.
    pub fn mandel(&self) -> [[f64; 6]; 6] {
        to_mandel(&self.ss)
    }

    /// Returns the polarization tensor in the Mandel basis
    pub fn polarization_mandel(&self) -> [[f64; 6]; 6] {
        to_mandel(&self.pp)
    }

    /// Calculates the constrained strain `εᶜ = S : ε*` corresponding to the eigenstrain ε*
    pub fn apply(&self, eigenstrain: &Tensor2) -> Result<Tensor2> {
        let eps = tensor_components(eigenstrain);
        let res = self.apply_matrix(&eps);
        Ok(Tensor2::from_matrix(&res, Mandel::Symmetric)?)
    }

    /// Calculates `S : ε` with ε given as a symmetric 3×3 matrix
    pub(crate) fn apply_matrix(&self, eps: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
        let v = mandel_vector(eps);
        let mm = self.mandel();
        let mut res = [0.0; 6];
        for i in 0..6 {
            for j in 0..6 {
                res[i] += mm[i][j] * v[j];
            }
        }
        mandel_to_matrix(&res)
    }

    /// Builds the tensor from a closed-form Eshelby tensor; P is recovered from `P = S : C⁻¹`
    fn from_eshelby(
        semi_axes: &[f64; 3],
        ss: Tensor4Array,
        matrix: &ElasticConstants,
        evaluation: EshelbyEvaluation,
    ) -> Result<Self> {
        let cm = matrix.mandel();
        let mut cc = Matrix::new(6, 6);
        let mut ci = Matrix::new(6, 6);
        for i in 0..6 {
            for j in 0..6 {
                cc.set(i, j, cm[i][j]);
            }
        }
        mat_inverse(&mut ci, &cc)?;
        let sm = to_mandel(&ss);
        let mut pm = [[0.0; 6]; 6];
        for i in 0..6 {
            for j in 0..6 {
                for k in 0..6 {
                    pm[i][j] += sm[i][k] * ci.get(k, j);
                }
            }
        }
        Ok(EshelbyTensor {
            semi_axes: *semi_axes,
            ss,
            pp: from_mandel(&pm),
            evaluation,
        })
    }

    /// Builds the tensor by quadrature of the Green's function kernel
    fn from_quadrature(semi_axes: &[f64; 3], matrix: &ElasticConstants, params: &QuadratureParams) -> Result<Self> {
        let rule = SphereRule::graded_hemisphere(semi_axes, params);
        let pp = polarization_tensor(semi_axes, matrix, &rule)?;
        let mut ss = [[[[0.0; 3]; 3]; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    for l in 0..3 {
                        let mut sum = 0.0;
                        for p in 0..3 {
                            for q in 0..3 {
                                sum += pp[i][j][p][q] * matrix.component(p, q, k, l);
                            }
                        }
                        ss[i][j][k][l] = sum;
                    }
                }
            }
        }
        Ok(EshelbyTensor {
            semi_axes: *semi_axes,
            ss,
            pp,
            evaluation: EshelbyEvaluation::Quadrature,
        })
    }
}

/// Integrates the Green's function kernel with the given rule
fn polarization_tensor(semi_axes: &[f64; 3], matrix: &ElasticConstants, rule: &SphereRule) -> Result<Tensor4Array> {
    let mut pp = [[[[0.0; 3]; 3]; 3]; 3];
    for (zeta, weight) in rule.directions.iter().zip(rule.weights.iter()) {
        let mut xi = [zeta[0] / semi_axes[0], zeta[1] / semi_axes[1], zeta[2] / semi_axes[2]];
        let norm = f64::sqrt(xi[0] * xi[0] + xi[1] * xi[1] + xi[2] * xi[2]);
        for v in xi.iter_mut() {
            *v /= norm;
        }
        let kk = matrix.acoustic_tensor(&xi);
        let nn = inverse_3x3(&kk).ok_or(Error::Linalg("acoustic tensor is singular"))?;
        let w = 0.25 * weight;
        for (m, (i, j)) in VOIGT_PAIRS.iter().enumerate() {
            for (k, l) in VOIGT_PAIRS.iter().skip(m) {
                let (i, j, k, l) = (*i, *j, *k, *l);
                pp[i][j][k][l] += w
                    * (nn[i][k] * xi[j] * xi[l]
                        + nn[j][k] * xi[i] * xi[l]
                        + nn[i][l] * xi[j] * xi[k]
                        + nn[j][l] * xi[i] * xi[k]);
            }
        }
    }
    // P has the major symmetry too; fill the remaining components
    let mut full = [[[[0.0; 3]; 3]; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                for l in 0..3 {
                    let (m, n) = (voigt_index(i, j), voigt_index(k, l));
                    let (a, b) = if m <= n { (m, n) } else { (n, m) };
                    let (p, q) = VOIGT_PAIRS[a];
                    let (r, s) = VOIGT_PAIRS[b];
                    full[i][j][k][l] = pp[p][q][r][s];
                }
            }
        }
    }
    Ok(full)
}

/// Returns the unique-axis index and the ratio ρ = a_unique / a_equal if two semi-axes are equal
///
/// For a sphere, returns (2, 1.0).
fn spheroid_ratio(semi_axes: &[f64; 3]) -> Option<(usize, f64)> {
    let equal = |a: f64, b: f64| f64::abs(a - b) <= AXES_TOLERANCE * f64::max(a, b);
    let [a1, a2, a3] = *semi_axes;
    if equal(a1, a2) && equal(a2, a3) {
        return Some((2, 1.0));
    }
    if equal(a1, a2) {
        Some((2, a3 / a1))
    } else if equal(a1, a3) {
        Some((1, a2 / a1))
    } else if equal(a2, a3) {
        Some((0, a1 / a2))
    } else {
        None
    }
}

/// Computes the Eshelby tensor of a sphere in an isotropic matrix
fn sphere_eshelby(nu: f64) -> Tensor4Array {
    let den = 15.0 * (1.0 - nu);
    let a = (5.0 * nu - 1.0) / den;
    let b = (4.0 - 5.0 * nu) / den;
    let delta = |i: usize, j: usize| if i == j { 1.0 } else { 0.0 };
    let mut ss = [[[[0.0; 3]; 3]; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                for l in 0..3 {
                    ss[i][j][k][l] = a * delta(i, j) * delta(k, l) + b * (delta(i, k) * delta(j, l) + delta(i, l) * delta(j, k));
                }
            }
        }
    }
    ss
}

/// Computes the Eshelby tensor of a spheroid in an isotropic matrix
///
/// The spheroid has semi-axes (a, a, ρa) in a local frame whose third axis is the unique
/// axis `unique` of the global frame. ρ > 1 is prolate (needle) and ρ < 1 is oblate (plate).
fn spheroid_eshelby(unique: usize, rho: f64, nu: f64) -> Tensor4Array {
    let r2 = rho * rho;
    let g = if rho > 1.0 {
        rho / f64::powf(r2 - 1.0, 1.5) * (rho * f64::sqrt(r2 - 1.0) - f64::acosh(rho))
    } else {
        rho / f64::powf(1.0 - r2, 1.5) * (f64::acos(rho) - rho * f64::sqrt(1.0 - r2))
    };
    let q = r2 - 1.0;
    let d = 1.0 - nu;
    let c = 1.0 - 2.0 * nu;
    let s1111 = 3.0 / (8.0 * d) * r2 / q + 1.0 / (4.0 * d) * (c - 9.0 / (4.0 * q)) * g;
    let s3333 = 1.0 / (2.0 * d) * (c + (3.0 * r2 - 1.0) / q - (c + 3.0 * r2 / q) * g);
    let s1122 = 1.0 / (4.0 * d) * (r2 / (2.0 * q) - (c + 3.0 / (4.0 * q)) * g);
    let s1133 = 1.0 / (2.0 * d) * (-r2 / q + 0.5 * (3.0 * r2 / q - c) * g);
    let s3311 = 1.0 / (2.0 * d) * (-c - 1.0 / q + (c + 3.0 / (2.0 * q)) * g);
    let s1212 = 1.0 / (4.0 * d) * (r2 / (2.0 * q) + (c - 3.0 / (4.0 * q)) * g);
    let s1313 = 1.0 / (4.0 * d) * (c - (r2 + 1.0) / q - 0.5 * (c - 3.0 * (r2 + 1.0) / q) * g);

    // local frame: 0 and 1 are the equal axes, 2 is the unique axis
    let mut local = [[[[0.0; 3]; 3]; 3]; 3];
    for i in 0..2 {
        local[i][i][i][i] = s1111;
        local[i][i][1 - i][1 - i] = s1122;
        local[i][i][2][2] = s1133;
        local[2][2][i][i] = s3311;
        for (p, q, r, s) in [(i, 2, i, 2), (i, 2, 2, i), (2, i, i, 2), (2, i, 2, i)] {
            local[p][q][r][s] = s1313;
        }
    }
    local[2][2][2][2] = s3333;
    for (p, q, r, s) in [(0, 1, 0, 1), (0, 1, 1, 0), (1, 0, 0, 1), (1, 0, 1, 0)] {
        local[p][q][r][s] = s1212;
    }

    let perm = [(unique + 1) % 3, (unique + 2) % 3, unique];
    let mut ss = [[[[0.0; 3]; 3]; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                for l in 0..3 {
                    ss[perm[i]][perm[j]][perm[k]][perm[l]] = local[i][j][k][l];
                }
            }
        }
    }
    ss
}

/// Converts a fourth-order tensor with minor symmetries to the Mandel basis
pub(crate) fn to_mandel(tt: &Tensor4Array) -> [[f64; 6]; 6] {
    let mut mm = [[0.0; 6]; 6];
    for (m, (i, j)) in VOIGT_PAIRS.iter().enumerate() {
        for (n, (k, l)) in VOIGT_PAIRS.iter().enumerate() {
            mm[m][n] = mandel_weight(m) * mandel_weight(n) * tt[*i][*j][*k][*l];
        }
    }
    mm
}

/// Converts a Mandel 6×6 matrix into a fourth-order tensor with minor symmetries
pub(crate) fn from_mandel(mm: &[[f64; 6]; 6]) -> Tensor4Array {
    let mut tt = [[[[0.0; 3]; 3]; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                for l in 0..3 {
                    let (m, n) = (voigt_index(i, j), voigt_index(k, l));
                    tt[i][j][k][l] = mm[m][n] / (mandel_weight(m) * mandel_weight(n));
                }
            }
        }
    }
    tt
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
