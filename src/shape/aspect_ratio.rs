use super::check_aspect_ratio;
use crate::base::Result;
use std::fmt;
use std::sync::Arc;

/// Defines the aspect ratio of precipitates, either fixed or as a function of the short-axis radius
///
/// The function must be monotonic non-decreasing and must return values ≥ 1; values violating
/// the last condition are rejected when evaluated.
#[derive(Clone)]
pub enum AspectRatio {
    /// Fixed aspect ratio
    Constant(f64),

    /// Aspect ratio as a function α(r) of the short-axis radius r
    Function(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl AspectRatio {
    /// Allocates a radius-dependent aspect ratio
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        AspectRatio::Function(Arc::new(f))
    }

    /// Indicates whether the aspect ratio depends on the radius
    pub fn is_constant(&self) -> bool {
        matches!(self, AspectRatio::Constant(_))
    }

    /// Evaluates the aspect ratio at the short-axis radius r
    pub fn value(&self, short_radius: f64) -> Result<f64> {
        match self {
            AspectRatio::Constant(alpha) => check_aspect_ratio(*alpha),
            AspectRatio::Function(f) => check_aspect_ratio(f(short_radius)),
        }
    }
}

impl fmt::Debug for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectRatio::Constant(alpha) => write!(f, "Constant({:?})", alpha),
            AspectRatio::Function(_) => write!(f, "Function(..)"),
        }
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio::Constant(1.0)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::AspectRatio;
    use crate::base::Error;

    #[test]
    fn value_works() {
        let fixed = AspectRatio::Constant(3.0);
        assert!(fixed.is_constant());
        assert_eq!(fixed.value(1e-9).unwrap(), 3.0);
        let linear = AspectRatio::function(|r| 1.0 + r / 1e-9);
        assert!(!linear.is_constant());
        assert_eq!(linear.value(2e-9).unwrap(), 3.0);
        assert_eq!(AspectRatio::default().value(1.0).unwrap(), 1.0);
    }

    #[test]
    fn value_captures_errors() {
        assert!(matches!(AspectRatio::Constant(0.5).value(1.0), Err(Error::InvalidInput(_))));
        let bad = AspectRatio::function(|r| r);
        assert!(matches!(bad.value(0.1), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn debug_works() {
        assert_eq!(format!("{:?}", AspectRatio::Constant(2.5)), "Constant(2.5)");
        assert_eq!(format!("{:?}", AspectRatio::function(|_| 2.0)), "Function(..)");
    }
}
