use super::{check_finite, Error, Result, TensorInput};
use crate::elasticity::{ElasticConstants, ElasticModuli, StrainEnergy, StrainEnergyParams};
use crate::shape::Morphology;
use crate::solver::{AspectRatioSolver, SolverParams};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Specifies the elastic stiffness of a phase
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialInput {
    /// Isotropic material given by (at least) two moduli
    Moduli(ElasticModuli),

    /// Cubic crystal
    Cubic { c11: f64, c12: f64, c44: f64 },

    /// General anisotropic crystal given by the 6×6 Voigt matrix
    Voigt([[f64; 6]; 6]),
}

impl MaterialInput {
    /// Returns the elastic constants
    pub fn elastic_constants(&self) -> Result<ElasticConstants> {
        match self {
            MaterialInput::Moduli(moduli) => ElasticConstants::from_moduli(moduli),
            MaterialInput::Cubic { c11, c12, c44 } => ElasticConstants::from_cubic(*c11, *c12, *c44),
            MaterialInput::Voigt(data) => ElasticConstants::from_voigt_array(data),
        }
    }
}

/// Holds all the data required to compute the shape of the precipitates of one phase
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KwnShapeConfig {
    /// Stiffness of the matrix
    pub matrix: MaterialInput,

    /// Stiffness of the precipitate (None means the same as the matrix)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitate: Option<MaterialInput>,

    /// Transformation strain (misfit) of the precipitate
    pub eigenstrain: TensorInput,

    /// Applied stress
    #[serde(default)]
    pub external_stress: TensorInput,

    /// Morphology of the precipitates
    pub morphology: Morphology,

    /// Precipitate-matrix interfacial energy γ (J/m²)
    pub interfacial_energy: f64,

    /// Parameters of the strain energy calculations
    #[serde(default)]
    pub energy: StrainEnergyParams,

    /// Parameters of the aspect-ratio search
    #[serde(default)]
    pub solver: SolverParams,
}

impl KwnShapeConfig {
    /// Allocates a new instance with default parameters, no applied stress, and a homogeneous precipitate
    pub fn new(
        matrix: MaterialInput,
        eigenstrain: TensorInput,
        morphology: Morphology,
        interfacial_energy: f64,
    ) -> Self {
        KwnShapeConfig {
            matrix,
            precipitate: None,
            eigenstrain,
            external_stress: TensorInput::zero(),
            morphology,
            interfacial_energy,
            energy: StrainEnergyParams::new(),
            solver: SolverParams::new(),
        }
    }

    /// Sets the stiffness of the precipitate
    pub fn set_precipitate(&mut self, precipitate: MaterialInput) -> Result<&mut Self> {
        precipitate.elastic_constants()?;
        self.precipitate = Some(precipitate);
        Ok(self)
    }

    /// Sets the applied stress
    pub fn set_external_stress(&mut self, stress: TensorInput) -> Result<&mut Self> {
        stress.to_tensor()?;
        self.external_stress = stress;
        Ok(self)
    }

    /// Sets the interfacial energy γ (J/m²)
    pub fn set_interfacial_energy(&mut self, gamma: f64) -> Result<&mut Self> {
        self.interfacial_energy = check_interfacial_energy(gamma)?;
        Ok(self)
    }

    /// Sets the parameters of the strain energy calculations
    pub fn set_energy_params(&mut self, params: StrainEnergyParams) -> Result<&mut Self> {
        params.quadrature.validate()?;
        self.energy = params;
        Ok(self)
    }

    /// Sets the parameters of the aspect-ratio search
    pub fn set_solver_params(&mut self, params: SolverParams) -> Result<&mut Self> {
        params.validate()?;
        self.solver = params;
        Ok(self)
    }

    /// Validates all data
    pub fn validate(&self) -> Result<()> {
        self.matrix.elastic_constants()?;
        if let Some(p) = &self.precipitate {
            p.elastic_constants()?;
        }
        self.eigenstrain.to_tensor()?;
        self.external_stress.to_tensor()?;
        check_interfacial_energy(self.interfacial_energy)?;
        self.energy.quadrature.validate()?;
        self.solver.validate()
    }

    /// Allocates the strain energy model
    pub fn strain_energy(&self) -> Result<StrainEnergy> {
        let matrix = self.matrix.elastic_constants()?;
        let mut model =
            StrainEnergy::new(matrix, self.eigenstrain, self.energy)?.with_external_stress(self.external_stress)?;
        if let Some(p) = &self.precipitate {
            model = model.with_precipitate(p.elastic_constants()?);
        }
        Ok(model)
    }

    /// Allocates the aspect-ratio solver
    pub fn solver(&self) -> Result<AspectRatioSolver> {
        AspectRatioSolver::new(self.solver)
    }

    /// Parses a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: KwnShapeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns a (pretty) JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads a JSON file
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let input = File::open(path)?;
        let buffered = BufReader::new(input);
        let config: KwnShapeConfig = serde_json::from_reader(buffered)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes a JSON file
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn write_json<P>(&self, full_path: &P) -> Result<()>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        if let Some(p) = path.parent() {
            fs::create_dir_all(p)?;
        }
        let mut file = File::create(&path)?;
        serde_json::to_writer_pretty(&mut file, &self)?;
        Ok(())
    }
}

/// Checks the interfacial energy (must be finite and ≥ 0)
pub(crate) fn check_interfacial_energy(gamma: f64) -> Result<f64> {
    if check_finite("interfacial energy", gamma)? < 0.0 {
        return Err(Error::InvalidInput(format!(
            "interfacial energy must be ≥ 0 (got {})",
            gamma
        )));
    }
    Ok(gamma)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{KwnShapeConfig, MaterialInput};
    use crate::base::{Error, Samples, TensorInput};
    use crate::elasticity::{ElasticModuli, EnergyMethod, StrainEnergyModel};
    use crate::shape::Morphology;
    use crate::solver::SearchMethod;

    #[test]
    fn from_json_works() {
        let json = r#"{
            "matrix": { "moduli": { "shear": 57.1e9, "poisson": 0.33 } },
            "eigenstrain": { "diagonal": [6.67e-3, 6.67e-3, 2.86e-2] },
            "morphology": "plate",
            "interfacial_energy": 0.02375
        }"#;
        let config = KwnShapeConfig::from_json(json).unwrap();
        assert_eq!(config, Samples::in718_gamma_double_prime());
        assert_eq!(config.external_stress, TensorInput::zero());
        assert_eq!(config.energy.method, EnergyMethod::Auto);
        assert_eq!(config.solver.method, SearchMethod::GoldenSection);

        let json = r#"{
            "matrix": { "cubic": { "c11": 168.4e9, "c12": 121.4e9, "c44": 75.4e9 } },
            "precipitate": { "moduli": { "young": 200e9, "poisson": 0.3 } },
            "eigenstrain": { "scalar": 0.01 },
            "external_stress": { "full": [[0.0, 1e6, 0.0], [1e6, 0.0, 0.0], [0.0, 0.0, 0.0]] },
            "morphology": "cuboidal",
            "interfacial_energy": 0.1,
            "energy": { "method": "khachaturyan", "quadrature": { "panel_order": 8, "grading_levels": 4, "n_azimuth": 24, "cubed_sphere_order": 10 } },
            "solver": { "method": "cached_grid", "alpha_max": 20.0, "tolerance": 1e-6, "max_iterations": 100,
                        "max_rebounds": 1, "grid_step": 0.02, "radius_bucket": 1e-3, "verbose": false }
        }"#;
        let config = KwnShapeConfig::from_json(json).unwrap();
        assert_eq!(config.morphology, Morphology::Cuboidal);
        assert_eq!(config.energy.quadrature.panel_order, 8);
        assert_eq!(config.solver.grid_step, 0.02);
        assert!(config.precipitate.is_some());
    }

    #[test]
    fn json_round_trip_works() {
        let mut config = Samples::cu_cu4ti();
        config
            .set_precipitate(MaterialInput::Moduli(ElasticModuli::young_poisson(150e9, 0.3)))
            .unwrap()
            .set_external_stress(TensorInput::Diagonal([0.0, 0.0, 50e6]))
            .unwrap();
        let json = config.to_json().unwrap();
        let back = KwnShapeConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
        assert_eq!(
            back.strain_energy().unwrap().fingerprint(),
            config.strain_energy().unwrap().fingerprint()
        );
    }

    #[test]
    fn read_and_write_json_work() {
        let path = std::env::temp_dir().join("kwnshape").join("test_config_in718.json");
        let config = Samples::in718_gamma_double_prime();
        config.write_json(&path).unwrap();
        let back = KwnShapeConfig::read_json(&path).unwrap();
        assert_eq!(back, config);
        assert!(matches!(
            KwnShapeConfig::read_json("/tmp/kwnshape/__not_found__.json"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn config_captures_errors() {
        assert!(matches!(KwnShapeConfig::from_json("{"), Err(Error::Json(_))));
        let json = r#"{
            "matrix": { "moduli": { "shear": 57.1e9 } },
            "eigenstrain": { "scalar": 0.01 },
            "morphology": "plate",
            "interfacial_energy": 0.02
        }"#;
        assert!(matches!(KwnShapeConfig::from_json(json), Err(Error::Configuration(_))));
        let json = r#"{
            "matrix": { "cubic": { "c11": 100e9, "c12": 150e9, "c44": 50e9 } },
            "eigenstrain": { "scalar": 0.01 },
            "morphology": "plate",
            "interfacial_energy": 0.02
        }"#;
        assert!(matches!(KwnShapeConfig::from_json(json), Err(Error::InvalidMaterial(_))));
        let mut config = Samples::cu_cu4ti();
        assert!(matches!(
            config.set_interfacial_energy(-1.0),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            config.set_external_stress(TensorInput::Full([[0.0, 1.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]])),
            Err(Error::InvalidInput(_))
        ));
        config.interfacial_energy = f64::NAN;
        assert!(matches!(config.validate(), Err(Error::InvalidInput(_))));
    }
}
