use crate::base::{Error, Result};
use serde::{Deserialize, Serialize};

/// Defines the algorithm used to find the equilibrium aspect ratio
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    /// Golden-section search over [1, alpha_max]
    GoldenSection,

    /// Minimum over a fixed log-spaced grid with cached energy tables and results
    CachedGrid,
}

/// Holds the parameters of the equilibrium aspect-ratio search
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolverParams {
    /// Search algorithm
    pub method: SearchMethod,

    /// Upper bound of the search interval (the lower bound is 1)
    pub alpha_max: f64,

    /// Relative tolerance on the width of the golden-section bracket
    pub tolerance: f64,

    /// Maximum number of golden-section iterations
    pub max_iterations: usize,

    /// Number of times the upper bound may be doubled when the minimizer is found at the boundary
    pub max_rebounds: usize,

    /// Relative step δ of the grid α_k = (1 + δ)^k
    pub grid_step: f64,

    /// Relative width of the radius buckets of the result cache
    pub radius_bucket: f64,

    /// Prints messages about re-bounding and cache usage
    pub verbose: bool,
}

impl SolverParams {
    /// Allocates a new instance with default values
    pub fn new() -> Self {
        SolverParams {
            method: SearchMethod::GoldenSection,
            alpha_max: 50.0,
            tolerance: 1e-5,
            max_iterations: 200,
            max_rebounds: 2,
            grid_step: 0.01,
            radius_bucket: 1e-4,
            verbose: false,
        }
    }

    /// Sets the search method
    pub fn set_method(&mut self, method: SearchMethod) -> Result<&mut Self> {
        self.method = method;
        Ok(self)
    }

    /// Sets the upper bound of the search interval
    pub fn set_alpha_max(&mut self, value: f64) -> Result<&mut Self> {
        if !value.is_finite() || value <= 1.0 {
            return Err(Error::Configuration("alpha_max must be finite and > 1".to_string()));
        }
        self.alpha_max = value;
        Ok(self)
    }

    /// Sets the relative tolerance of the golden-section search
    pub fn set_tolerance(&mut self, value: f64) -> Result<&mut Self> {
        if !(value > 0.0 && value < 1.0) {
            return Err(Error::Configuration("tolerance must be in (0, 1)".to_string()));
        }
        self.tolerance = value;
        Ok(self)
    }

    /// Sets the maximum number of golden-section iterations
    pub fn set_max_iterations(&mut self, value: usize) -> Result<&mut Self> {
        if value < 1 {
            return Err(Error::Configuration("max_iterations must be ≥ 1".to_string()));
        }
        self.max_iterations = value;
        Ok(self)
    }

    /// Sets the number of allowed re-bounds
    pub fn set_max_rebounds(&mut self, value: usize) -> Result<&mut Self> {
        self.max_rebounds = value;
        Ok(self)
    }

    /// Sets the relative grid step
    pub fn set_grid_step(&mut self, value: f64) -> Result<&mut Self> {
        if !(value > 0.0 && value <= 1.0) {
            return Err(Error::Configuration("grid_step must be in (0, 1]".to_string()));
        }
        self.grid_step = value;
        Ok(self)
    }

    /// Sets the relative width of the radius buckets
    pub fn set_radius_bucket(&mut self, value: f64) -> Result<&mut Self> {
        if !(value > 0.0 && value < 1.0) {
            return Err(Error::Configuration("radius_bucket must be in (0, 1)".to_string()));
        }
        self.radius_bucket = value;
        Ok(self)
    }

    /// Enables or disables the messages
    pub fn set_verbose(&mut self, flag: bool) -> Result<&mut Self> {
        self.verbose = flag;
        Ok(self)
    }

    /// Validates all parameters (e.g., after deserialization)
    pub fn validate(&self) -> Result<()> {
        let mut copy = *self;
        copy.set_alpha_max(self.alpha_max)?
            .set_tolerance(self.tolerance)?
            .set_max_iterations(self.max_iterations)?
            .set_grid_step(self.grid_step)?
            .set_radius_bucket(self.radius_bucket)?;
        Ok(())
    }
}

impl Default for SolverParams {
    fn default() -> Self {
        SolverParams::new()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{SearchMethod, SolverParams};
    use crate::base::Error;

    #[test]
    fn setters_work() {
        let mut params = SolverParams::new();
        params
            .set_method(SearchMethod::CachedGrid)
            .unwrap()
            .set_alpha_max(20.0)
            .unwrap()
            .set_grid_step(0.02)
            .unwrap()
            .set_verbose(true)
            .unwrap();
        assert_eq!(params.method, SearchMethod::CachedGrid);
        assert_eq!(params.alpha_max, 20.0);
        assert_eq!(params.grid_step, 0.02);
        assert!(params.verbose);
        assert_eq!(params.validate(), Ok(()));
    }

    #[test]
    fn setters_capture_errors() {
        let mut params = SolverParams::new();
        assert!(matches!(params.set_alpha_max(1.0), Err(Error::Configuration(_))));
        assert!(matches!(params.set_tolerance(0.0), Err(Error::Configuration(_))));
        assert!(matches!(params.set_tolerance(f64::NAN), Err(Error::Configuration(_))));
        assert!(matches!(params.set_max_iterations(0), Err(Error::Configuration(_))));
        assert!(matches!(params.set_grid_step(2.0), Err(Error::Configuration(_))));
        assert!(matches!(params.set_radius_bucket(-1.0), Err(Error::Configuration(_))));
        params.alpha_max = 0.5;
        assert!(matches!(params.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn serde_works() {
        let params = SolverParams::new();
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"method\":\"golden_section\""));
        let back: SolverParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
