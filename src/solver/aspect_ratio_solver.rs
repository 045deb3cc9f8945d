use super::{golden_section, AspectRatioCache, ResultKey, SearchMethod, SolverParams, TableKey};
use crate::base::{check_interfacial_energy, Error, Result, FOUR_PI_BY_3};
use crate::elasticity::StrainEnergyModel;
use crate::shape::{check_radius, Morphology, ShapeFactor};
use russell_lab::math::PI;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use std::sync::Arc;

/// Holds the shape of a precipitate size class as required by the KWN driver
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeState {
    /// Aspect ratio α
    pub aspect_ratio: f64,

    /// Short-axis radius r
    pub short_radius: f64,

    /// Gibbs-Thomson correction g(α)
    pub gibbs_thomson: f64,

    /// Growth-rate correction f(α)
    pub growth_rate: f64,
}

impl ShapeState {
    /// Allocates a new instance from the morphology, the equivalent spherical radius, and the aspect ratio
    pub fn new(morphology: Morphology, equivalent_radius: f64, aspect_ratio: f64) -> Result<Self> {
        Ok(ShapeState {
            aspect_ratio,
            short_radius: morphology.short_radius(equivalent_radius, aspect_ratio)?,
            gibbs_thomson: morphology.gibbs_thomson_factor(aspect_ratio)?,
            growth_rate: morphology.growth_rate_factor(aspect_ratio)?,
        })
    }
}

/// Finds the aspect ratio minimizing the sum of elastic and interfacial energies
///
/// The total energy of a precipitate with equivalent spherical radius R is
///
/// ```text
///        4                             2
/// h(α) = ─ π R³ ΔG_el(α)  +  4 π R  g(α) γ
///        3
/// ```
///
/// where ΔG_el is the elastic energy per unit volume, g the Gibbs-Thomson correction, and γ the
/// interfacial energy. The search interval is `[1, alpha_max]`.
pub struct AspectRatioSolver {
    /// Holds the parameters
    params: SolverParams,

    /// Holds the cache of the grid search
    cache: Arc<AspectRatioCache>,
}

impl AspectRatioSolver {
    /// Allocates a new instance with its own cache
    pub fn new(params: SolverParams) -> Result<Self> {
        params.validate()?;
        Ok(AspectRatioSolver {
            params,
            cache: Arc::new(AspectRatioCache::new()),
        })
    }

    /// Replaces the cache (e.g., to share it among solvers)
    pub fn with_cache(mut self, cache: Arc<AspectRatioCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Returns the parameters
    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    /// Returns the cache
    pub fn cache(&self) -> &Arc<AspectRatioCache> {
        &self.cache
    }

    /// Calculates the equilibrium aspect ratio of a precipitate
    ///
    /// # Input
    ///
    /// * `equivalent_radius` -- equivalent spherical radius R (m)
    /// * `gamma` -- interfacial energy γ (J/m²)
    /// * `morphology` -- needle or plate
    /// * `model` -- elastic energy density
    ///
    /// # Errors
    ///
    /// * `InvalidInput` if R is not positive or γ is negative
    /// * `UnsupportedMorphology` for spheres and cuboids (no free shape parameter)
    /// * `NumericalNonConvergence` if the minimum stays at the upper bound of the interval or the
    ///   search exceeds its iteration budget
    pub fn equilibrium_aspect_ratio<M>(
        &self,
        equivalent_radius: f64,
        gamma: f64,
        morphology: Morphology,
        model: &M,
    ) -> Result<f64>
    where
        M: StrainEnergyModel + ?Sized,
    {
        check_radius("equivalent spherical radius", equivalent_radius)?;
        check_interfacial_energy(gamma)?;
        if !morphology.has_free_shape() {
            return Err(Error::UnsupportedMorphology(format!(
                "the aspect ratio of {} precipitates cannot be optimized",
                morphology
            )));
        }
        match self.params.method {
            SearchMethod::GoldenSection => self.golden_section_search(equivalent_radius, gamma, morphology, model),
            SearchMethod::CachedGrid => self.grid_search(equivalent_radius, gamma, morphology, model),
        }
    }

    /// Calculates the shape state of a size class
    ///
    /// If `optimize` is true, the aspect ratio minimizes the total energy; otherwise, the aspect
    /// ratio is given by the shape factor (and the model is not used).
    pub fn evaluate<M>(
        &self,
        equivalent_radius: f64,
        gamma: f64,
        shape: &ShapeFactor,
        model: &M,
        optimize: bool,
    ) -> Result<ShapeState>
    where
        M: StrainEnergyModel + ?Sized,
    {
        let morphology = shape.morphology;
        let alpha = if optimize {
            self.equilibrium_aspect_ratio(equivalent_radius, gamma, morphology, model)?
        } else {
            shape.aspect_ratio_of(equivalent_radius)?
        };
        let mut state = ShapeState::new(morphology, equivalent_radius, alpha)?;
        if !optimize {
            // keeps the self-consistent radius of radius-dependent aspect ratios
            state.short_radius = shape.short_radius(equivalent_radius)?;
        }
        Ok(state)
    }

    /// Minimizes the total energy with the golden-section search, doubling the interval if needed
    fn golden_section_search<M>(&self, radius: f64, gamma: f64, morphology: Morphology, model: &M) -> Result<f64>
    where
        M: StrainEnergyModel + ?Sized,
    {
        let mut upper = self.params.alpha_max;
        let mut rebounds = 0;
        loop {
            let res = golden_section(
                1.0,
                upper,
                self.params.tolerance,
                self.params.max_iterations,
                |alpha| shape_energy(radius, gamma, morphology, alpha, model),
            )?;
            if !res.at_upper {
                return Ok(res.x);
            }
            if rebounds == self.params.max_rebounds {
                return Err(Error::NumericalNonConvergence(format!(
                    "the energy minimum of the {} stays at the upper bound α = {} (R = {:e}, γ = {})",
                    morphology, upper, radius, gamma
                )));
            }
            rebounds += 1;
            upper *= 2.0;
            if self.params.verbose {
                println!("{}: minimum at the upper bound; re-bounding to α_max = {}", morphology, upper);
            }
        }
    }

    /// Minimizes the total energy over the grid α_k = (1 + δ)^k using the cache
    fn grid_search<M>(&self, radius: f64, gamma: f64, morphology: Morphology, model: &M) -> Result<f64>
    where
        M: StrainEnergyModel + ?Sized,
    {
        let grid = self.grid_hash();
        let fingerprint = model.fingerprint();
        let width = f64::ln(1.0 + self.params.radius_bucket);
        let bucket = f64::round(f64::ln(radius) / width) as i64;
        let key = ResultKey {
            morphology,
            bucket,
            gamma: gamma.to_bits(),
            fingerprint,
            grid,
        };
        if let Some(alpha) = self.cache.result(&key) {
            return Ok(alpha);
        }

        // the radius is snapped to the bucket representative so that cold and warm caches agree
        let radius = f64::exp(bucket as f64 * width);
        let alphas = self.grid_points()?;
        let table_key = TableKey {
            morphology,
            fingerprint,
            grid,
        };
        let (densities, built) = self.cache.table(&table_key, || {
            alphas
                .iter()
                .map(|alpha| model.energy_density(morphology, *alpha))
                .collect()
        })?;
        if built && self.params.verbose {
            println!("{}: energy-density table with {} points", morphology, alphas.len());
        }

        let mut k_min = 0;
        let mut h_min = f64::INFINITY;
        for (k, (alpha, density)) in alphas.iter().zip(densities.iter()).enumerate() {
            let h = total_energy(radius, gamma, morphology, *alpha, *density)?;
            if h < h_min {
                k_min = k;
                h_min = h;
            }
        }
        if k_min == alphas.len() - 1 {
            return Err(Error::NumericalNonConvergence(format!(
                "the energy minimum of the {} is at the last grid point α = {} (R = {:e}, γ = {})",
                morphology,
                alphas[k_min],
                radius,
                gamma
            )));
        }
        let alpha = alphas[k_min];
        self.cache.store_result(key, alpha);
        if self.params.verbose {
            println!(
                "{}: α* = {} (cache hits = {}, misses = {})",
                morphology,
                alpha,
                self.cache.hits(),
                self.cache.misses()
            );
        }
        Ok(alpha)
    }

    /// Returns the grid α_k = (1 + δ)^k ≤ alpha_max
    fn grid_points(&self) -> Result<Vec<f64>> {
        let base = 1.0 + self.params.grid_step;
        let alpha_max = self.params.alpha_max * (1.0 + 1e-12);
        let alphas: Vec<f64> = (0..)
            .map(|k| f64::powi(base, k))
            .take_while(|alpha| *alpha <= alpha_max)
            .collect();
        if alphas.len() < 3 {
            return Err(Error::Configuration(
                "grid_step is too large for the aspect-ratio interval".to_string(),
            ));
        }
        Ok(alphas)
    }

    /// Returns a hash of the parameters defining the grid and the buckets
    fn grid_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        hasher.write_u64(self.params.grid_step.to_bits());
        hasher.write_u64(self.params.alpha_max.to_bits());
        hasher.write_u64(self.params.radius_bucket.to_bits());
        hasher.finish()
    }
}

/// Calculates the total (elastic plus interfacial) energy h(α) of a precipitate in J
pub fn shape_energy<M>(equivalent_radius: f64, gamma: f64, morphology: Morphology, aspect_ratio: f64, model: &M) -> Result<f64>
where
    M: StrainEnergyModel + ?Sized,
{
    let density = model.energy_density(morphology, aspect_ratio)?;
    total_energy(equivalent_radius, gamma, morphology, aspect_ratio, density)
}

/// Combines the elastic energy density and the interfacial energy into h(α)
fn total_energy(radius: f64, gamma: f64, morphology: Morphology, aspect_ratio: f64, density: f64) -> Result<f64> {
    let g = morphology.gibbs_thomson_factor(aspect_ratio)?;
    let h = FOUR_PI_BY_3 * radius * radius * radius * density + 4.0 * PI * radius * radius * g * gamma;
    if !h.is_finite() {
        return Err(Error::NumericalNonConvergence(format!(
            "the total energy is not finite at α = {}",
            aspect_ratio
        )));
    }
    Ok(h)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
