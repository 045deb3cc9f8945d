use thiserror::Error;

/// Defines the errors returned by the shape-factor and strain-energy computations
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// Insufficient or inconsistent specification of the elastic moduli
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The stiffness tensor is not positive-definite (physically unstable material)
    #[error("invalid material: {0}")]
    InvalidMaterial(String),

    /// Non-physical geometric or energy input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Aspect-ratio optimization requested for a morphology without a free shape parameter
    #[error("unsupported morphology: {0}")]
    UnsupportedMorphology(String),

    /// A numerical search did not bracket or reach a minimum within its budget
    #[error("numerical non-convergence: {0}")]
    NumericalNonConvergence(String),

    /// Failure reported by the linear algebra or root finding routines
    #[error("linear algebra failure: {0}")]
    Linalg(&'static str),

    /// Failure while reading or writing configuration files
    #[error("i/o failure: {0}")]
    Io(String),

    /// Malformed JSON configuration
    #[error("json failure: {0}")]
    Json(String),
}

/// Defines the result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

impl From<&'static str> for Error {
    /// Converts the static-string errors returned by the russell crates
    fn from(message: &'static str) -> Self {
        Error::Linalg(message)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// Returns an error if the value is not a finite number
pub(crate) fn check_finite(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidInput(format!("{} must be finite (got {})", name, value)))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{check_finite, Error};

    #[test]
    fn display_works() {
        let err = Error::InvalidInput("radius must be > 0".to_string());
        assert_eq!(format!("{}", err), "invalid input: radius must be > 0");
        let err = Error::from("matrix is singular");
        assert_eq!(err, Error::Linalg("matrix is singular"));
        assert_eq!(format!("{}", err), "linear algebra failure: matrix is singular");
    }

    #[test]
    fn check_finite_captures_errors() {
        assert_eq!(check_finite("x", 1.5), Ok(1.5));
        assert!(matches!(check_finite("x", f64::NAN), Err(Error::InvalidInput(_))));
        assert!(matches!(check_finite("x", f64::INFINITY), Err(Error::InvalidInput(_))));
    }
}
