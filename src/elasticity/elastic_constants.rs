use super::ElasticModuli;
use crate::base::{mandel_weight, voigt_index, Error, Result, VOIGT_PAIRS};
use russell_lab::{mat_cholesky, mat_inverse, Matrix};
use russell_tensor::LinElasticity;
use std::fmt;

/// Defines the relative tolerance used to detect isotropy
const ISOTROPY_TOLERANCE: f64 = 1e-10;

/// Holds the linear-elastic stiffness of a crystal in Voigt notation
///
/// The Voigt order is 11, 22, 33, 23, 13, 12 with engineering shear strains:
///
/// ```text
/// ┌     ┐   ┌                         ┐ ┌      ┐
/// │ σ11 │   │ C11 C12 C13 C14 C15 C16 │ │  ε11 │
/// │ σ22 │   │     C22 C23 C24 C25 C26 │ │  ε22 │
/// │ σ33 │ = │         C33 C34 C35 C36 │ │  ε33 │
/// │ σ23 │   │             C44 C45 C46 │ │ 2ε23 │
/// │ σ13 │   │    sym          C55 C56 │ │ 2ε13 │
/// │ σ12 │   │                     C66 │ │ 2ε12 │
/// └     ┘   └                         ┘ └      ┘
/// ```
///
/// All constructors check that the matrix is positive-definite.
#[derive(Clone, Debug)]
pub struct ElasticConstants {
    /// Holds the 6×6 Voigt stiffness matrix
    voigt: Matrix,

    /// Holds the full fourth-order stiffness components Cᵢⱼₖₗ
    full: [[[[f64; 3]; 3]; 3]; 3],

    /// Holds the Lamé parameters (λ, μ) if the material is isotropic
    lame: Option<(f64, f64)>,
}

impl ElasticConstants {
    /// Allocates a new instance from isotropic moduli
    ///
    /// # Errors
    ///
    /// * [Error::Configuration] if the moduli are insufficient or inconsistent
    /// * [Error::InvalidMaterial] if the resulting stiffness is not positive-definite
    pub fn from_moduli(moduli: &ElasticModuli) -> Result<Self> {
        let (lambda, mu) = moduli.lame_parameters()?;
        if mu <= 0.0 || lambda + 2.0 * mu / 3.0 <= 0.0 {
            return Err(Error::InvalidMaterial(format!(
                "isotropic stiffness with λ = {} and μ = {} is not positive-definite",
                lambda, mu
            )));
        }
        let young = mu * (3.0 * lambda + 2.0 * mu) / (lambda + mu);
        let poisson = lambda / (2.0 * (lambda + mu));
        let model = LinElasticity::new(young, poisson, false, false);
        let dd = model.get_modulus();
        let mut data = [[0.0; 6]; 6];
        for (m, (i, j)) in VOIGT_PAIRS.iter().enumerate() {
            for (n, (k, l)) in VOIGT_PAIRS.iter().enumerate() {
                data[m][n] = dd.get(*i, *j, *k, *l);
            }
        }
        let mut res = ElasticConstants::from_voigt_array(&data)?;
        res.lame = Some((lambda, mu));
        Ok(res)
    }

    /// Allocates a new instance from the three independent constants of a cubic crystal
    ///
    /// # Errors
    ///
    /// * [Error::InvalidMaterial] if the stiffness is not positive-definite
    ///   (i.e., unless c44 > 0, c11 > |c12| and c11 + 2 c12 > 0)
    pub fn from_cubic(c11: f64, c12: f64, c44: f64) -> Result<Self> {
        let mut data = [[0.0; 6]; 6];
        for i in 0..3 {
            for j in 0..3 {
                data[i][j] = if i == j { c11 } else { c12 };
            }
            data[i + 3][i + 3] = c44;
        }
        ElasticConstants::from_voigt_array(&data)
    }

    /// Allocates a new instance from a 6×6 Voigt matrix
    ///
    /// # Errors
    ///
    /// * [Error::Configuration] if the matrix is not 6×6, has non-finite entries, or is not symmetric
    /// * [Error::InvalidMaterial] if the matrix is not positive-definite
    pub fn from_voigt(voigt: &Matrix) -> Result<Self> {
        let (nrow, ncol) = voigt.dims();
        if nrow != 6 || ncol != 6 {
            return Err(Error::Configuration(format!(
                "the Voigt stiffness matrix must be 6×6 (got {}×{})",
                nrow, ncol
            )));
        }
        let mut data = [[0.0; 6]; 6];
        for i in 0..6 {
            for j in 0..6 {
                data[i][j] = voigt.get(i, j);
            }
        }
        ElasticConstants::from_voigt_array(&data)
    }

    /// Allocates a new instance from a 6×6 Voigt array
    ///
    /// See [ElasticConstants::from_voigt] for the errors.
    pub fn from_voigt_array(data: &[[f64; 6]; 6]) -> Result<Self> {
        let scale = data.iter().flatten().fold(0.0_f64, |acc, v| f64::max(acc, f64::abs(*v)));
        for i in 0..6 {
            for j in 0..6 {
                if !data[i][j].is_finite() {
                    return Err(Error::Configuration("stiffness entries must be finite".to_string()));
                }
                if f64::abs(data[i][j] - data[j][i]) > 1e-10 * scale {
                    return Err(Error::Configuration(format!(
                        "the Voigt stiffness matrix must be symmetric; C[{}][{}] ≠ C[{}][{}]",
                        i, j, j, i
                    )));
                }
            }
        }
        let voigt = Matrix::from(data);
        check_positive_definite(&voigt)?;
        let mut full = [[[[0.0; 3]; 3]; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    for l in 0..3 {
                        full[i][j][k][l] = data[voigt_index(i, j)][voigt_index(k, l)];
                    }
                }
            }
        }
        Ok(ElasticConstants {
            voigt,
            full,
            lame: detect_isotropy(data),
        })
    }

    /// Returns the 6×6 Voigt stiffness matrix
    pub fn voigt(&self) -> &Matrix {
        &self.voigt
    }

    /// Returns the 6×6 compliance matrix (inverse of the Voigt stiffness)
    pub fn compliance(&self) -> Result<Matrix> {
        let mut cc = Matrix::new(6, 6);
        mat_inverse(&mut cc, &self.voigt)?;
        Ok(cc)
    }

    /// Returns the stiffness in the Mandel basis (shear rows and columns scaled by √2)
    ///
    /// In this basis, the double contraction `σ = C : ε` is an ordinary matrix-vector product.
    pub fn mandel(&self) -> [[f64; 6]; 6] {
        let mut mm = [[0.0; 6]; 6];
        for i in 0..6 {
            for j in 0..6 {
                mm[i][j] = self.voigt.get(i, j) * mandel_weight(i) * mandel_weight(j);
            }
        }
        mm
    }

    /// Returns the component Cᵢⱼₖₗ
    #[inline]
    pub fn component(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        self.full[i][j][k][l]
    }

    /// Returns the Lamé parameters (λ, μ) if the material is isotropic
    pub fn isotropic_lame(&self) -> Option<(f64, f64)> {
        self.lame
    }

    /// Calculates the acoustic (Christoffel) tensor for the direction ξ
    ///
    /// ```text
    /// Kᵢₖ(ξ) = Cᵢⱼₖₗ ξⱼ ξₗ
    /// ```
    pub fn acoustic_tensor(&self, xi: &[f64; 3]) -> [[f64; 3]; 3] {
        let mut kk = [[0.0; 3]; 3];
        for i in 0..3 {
            for k in i..3 {
                let mut sum = 0.0;
                for j in 0..3 {
                    for l in 0..3 {
                        sum += self.full[i][j][k][l] * xi[j] * xi[l];
                    }
                }
                kk[i][k] = sum;
                kk[k][i] = sum;
            }
        }
        kk
    }

    /// Calculates σ = C : ε for a symmetric strain tensor given as a 3×3 matrix
    pub fn stress(&self, strain: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
        let mut sig = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                let mut sum = 0.0;
                for k in 0..3 {
                    for l in 0..3 {
                        sum += self.full[i][j][k][l] * strain[k][l];
                    }
                }
                sig[i][j] = sum;
            }
        }
        sig
    }

    /// Returns an integer hash of the stiffness entries (used by the aspect-ratio cache)
    pub(crate) fn hash_bits<H: std::hash::Hasher>(&self, state: &mut H) {
        for i in 0..6 {
            for j in 0..6 {
                state.write_u64(self.voigt.get(i, j).to_bits());
            }
        }
    }
}

impl fmt::Display for ElasticConstants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lame {
            Some((lambda, mu)) => writeln!(f, "isotropic: λ = {:?}, μ = {:?}", lambda, mu)?,
            None => writeln!(f, "anisotropic")?,
        }
        write!(f, "{}", self.voigt)
    }
}

/// Inverts a symmetric 3×3 matrix (e.g., the acoustic tensor)
///
/// Returns None if the matrix is singular. This runs once per quadrature direction, hence the
/// stack arrays instead of allocating a [Matrix] for [mat_inverse].
pub(crate) fn inverse_3x3(m: &[[f64; 3]; 3]) -> Option<[[f64; 3]; 3]> {
    let c00 = m[1][1] * m[2][2] - m[1][2] * m[2][1];
    let c01 = m[1][2] * m[2][0] - m[1][0] * m[2][2];
    let c02 = m[1][0] * m[2][1] - m[1][1] * m[2][0];
    let det = m[0][0] * c00 + m[0][1] * c01 + m[0][2] * c02;
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    let d = 1.0 / det;
    Some([
        [
            c00 * d,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * d,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * d,
        ],
        [
            c01 * d,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * d,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * d,
        ],
        [
            c02 * d,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * d,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * d,
        ],
    ])
}

/// Checks positive-definiteness by means of the Cholesky factorization
///
/// Pivots below 1e-14 of the largest diagonal entry are also rejected (nearly singular stiffness).
fn check_positive_definite(voigt: &Matrix) -> Result<()> {
    let not_positive_definite = || Error::InvalidMaterial("the stiffness matrix is not positive-definite".to_string());
    let scale = (0..6).fold(0.0_f64, |acc, i| f64::max(acc, f64::abs(voigt.get(i, i))));
    if scale == 0.0 {
        return Err(not_positive_definite());
    }
    let mut l = Matrix::new(6, 6);
    mat_cholesky(&mut l, voigt, false).map_err(|_| not_positive_definite())?;
    for i in 0..6 {
        let pivot = l.get(i, i) * l.get(i, i);
        if pivot <= 1e-14 * scale {
            return Err(not_positive_definite());
        }
    }
    Ok(())
}

/// Returns (λ, μ) if the Voigt matrix has the isotropic structure
fn detect_isotropy(a: &[[f64; 6]; 6]) -> Option<(f64, f64)> {
    let (c11, c12, c44) = (a[0][0], a[0][1], a[3][3]);
    let scale = f64::abs(c11);
    let close = |x: f64, y: f64| f64::abs(x - y) <= ISOTROPY_TOLERANCE * scale;
    for i in 0..6 {
        for j in 0..6 {
            let expected = match (i < 3, j < 3) {
                (true, true) => {
                    if i == j {
                        c11
                    } else {
                        c12
                    }
                }
                (false, false) if i == j => c44,
                _ => 0.0,
            };
            if !close(a[i][j], expected) {
                return None;
            }
        }
    }
    if !close(c44, 0.5 * (c11 - c12)) {
        return None;
    }
    Some((c12, c44))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
