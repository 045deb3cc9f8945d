use super::{Error, Result};
use russell_tensor::{Mandel, Tensor2};
use serde::{Deserialize, Serialize};

/// Holds a symmetric second-order tensor given in one of the shorthand forms
///
/// Eigenstrains and applied stresses may be specified by a single scalar (isotropic),
/// by the three diagonal values, or by the full 3×3 matrix. The value is normalized to a
/// symmetric [Tensor2] at the boundary by [TensorInput::to_tensor].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TensorInput {
    /// Isotropic: all diagonal entries equal, off-diagonal entries zero
    Scalar(f64),

    /// Diagonal values (x11, x22, x33), off-diagonal entries zero
    Diagonal([f64; 3]),

    /// Full symmetric matrix
    Full([[f64; 3]; 3]),
}

impl TensorInput {
    /// Returns a zero tensor input
    pub fn zero() -> Self {
        TensorInput::Scalar(0.0)
    }

    /// Returns the 3×3 matrix representation
    pub fn to_matrix(&self) -> [[f64; 3]; 3] {
        match *self {
            TensorInput::Scalar(v) => [[v, 0.0, 0.0], [0.0, v, 0.0], [0.0, 0.0, v]],
            TensorInput::Diagonal(d) => [[d[0], 0.0, 0.0], [0.0, d[1], 0.0], [0.0, 0.0, d[2]]],
            TensorInput::Full(m) => m,
        }
    }

    /// Converts the input into a symmetric second-order tensor
    ///
    /// Returns an error if any entry is not finite or if the full matrix is not symmetric.
    pub fn to_tensor(&self) -> Result<Tensor2> {
        let m = self.to_matrix();
        for i in 0..3 {
            for j in 0..3 {
                if !m[i][j].is_finite() {
                    return Err(Error::InvalidInput("tensor entries must be finite".to_string()));
                }
            }
        }
        let scale = m.iter().flatten().fold(0.0_f64, |acc, v| f64::max(acc, f64::abs(*v)));
        for (i, j) in [(0, 1), (0, 2), (1, 2)] {
            if f64::abs(m[i][j] - m[j][i]) > 1e-12 * f64::max(scale, 1.0) {
                return Err(Error::InvalidInput(format!(
                    "tensor must be symmetric; entry ({},{}) differs from ({},{})",
                    i, j, j, i
                )));
            }
        }
        // enforce exact symmetry before handing over to the Mandel representation
        let mut sym = m;
        for (i, j) in [(0, 1), (0, 2), (1, 2)] {
            let avg = 0.5 * (m[i][j] + m[j][i]);
            sym[i][j] = avg;
            sym[j][i] = avg;
        }
        Ok(Tensor2::from_matrix(&sym, Mandel::Symmetric)?)
    }

    /// Indicates whether all entries are zero
    pub fn is_zero(&self) -> bool {
        self.to_matrix().iter().flatten().all(|v| *v == 0.0)
    }
}

impl Default for TensorInput {
    fn default() -> Self {
        TensorInput::zero()
    }
}

/// Returns the 3×3 components of a second-order tensor
pub(crate) fn tensor_components(tt: &Tensor2) -> [[f64; 3]; 3] {
    let mut m = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            m[i][j] = tt.get(i, j);
        }
    }
    m
}

/// Returns the Mandel vector (11, 22, 33, √2·23, √2·13, √2·12) of a symmetric tensor
pub(crate) fn mandel_vector(m: &[[f64; 3]; 3]) -> [f64; 6] {
    let s = super::SQRT_2;
    [m[0][0], m[1][1], m[2][2], s * m[1][2], s * m[0][2], s * m[0][1]]
}

/// Returns the symmetric 3×3 matrix corresponding to a Mandel vector
pub(crate) fn mandel_to_matrix(v: &[f64; 6]) -> [[f64; 3]; 3] {
    let s = 1.0 / super::SQRT_2;
    [
        [v[0], s * v[5], s * v[4]],
        [s * v[5], v[1], s * v[3]],
        [s * v[4], s * v[3], v[2]],
    ]
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{mandel_to_matrix, mandel_vector, tensor_components, TensorInput};
    use crate::base::Error;
    use russell_lab::approx_eq;

    #[test]
    fn shorthand_forms_work() {
        let tt = TensorInput::Scalar(0.01).to_tensor().unwrap();
        assert_eq!(tensor_components(&tt), [[0.01, 0.0, 0.0], [0.0, 0.01, 0.0], [0.0, 0.0, 0.01]]);

        let tt = TensorInput::Diagonal([0.022, 0.022, 0.003]).to_tensor().unwrap();
        approx_eq(tt.get(0, 0), 0.022, 1e-15);
        approx_eq(tt.get(2, 2), 0.003, 1e-15);
        approx_eq(tt.get(0, 1), 0.0, 1e-15);

        let full = [[1.0, 0.5, 0.0], [0.5, 2.0, -0.25], [0.0, -0.25, 3.0]];
        let tt = TensorInput::Full(full).to_tensor().unwrap();
        for i in 0..3 {
            for j in 0..3 {
                approx_eq(tt.get(i, j), full[i][j], 1e-15);
            }
        }
        assert!(TensorInput::zero().is_zero());
        assert!(!TensorInput::Scalar(1.0).is_zero());
    }

    #[test]
    fn to_tensor_captures_errors() {
        let bad = TensorInput::Full([[1.0, 0.5, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 3.0]]);
        assert!(matches!(bad.to_tensor(), Err(Error::InvalidInput(_))));
        let bad = TensorInput::Diagonal([1.0, f64::NAN, 0.0]);
        assert!(matches!(bad.to_tensor(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn mandel_conversion_works() {
        let m = [[1.0, 0.5, 0.2], [0.5, 2.0, -0.25], [0.2, -0.25, 3.0]];
        let v = mandel_vector(&m);
        let back = mandel_to_matrix(&v);
        for i in 0..3 {
            for j in 0..3 {
                approx_eq(back[i][j], m[i][j], 1e-15);
            }
        }
        // double contraction equals the Mandel dot product
        let a: f64 = (0..3).map(|i| (0..3).map(|j| m[i][j] * m[i][j]).sum::<f64>()).sum();
        let b: f64 = v.iter().map(|x| x * x).sum();
        approx_eq(a, b, 1e-14);
    }

    #[test]
    fn serde_works() {
        let input = TensorInput::Diagonal([6.67e-3, 6.67e-3, 2.86e-2]);
        let json = serde_json::to_string(&input).unwrap();
        assert_eq!(json, r#"{"diagonal":[0.00667,0.00667,0.0286]}"#);
        let back: TensorInput = serde_json::from_str(&json).unwrap();
        assert_eq!(back, input);
    }
}
