use crate::base::{Error, Result, FOUR_PI_BY_3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Defines the eccentricity below which the series expansions of asin(e)/e and atanh(e)/e are used
const SERIES_ECCENTRICITY: f64 = 1e-4;

/// Defines the precipitate morphologies
///
/// The aspect ratio α ≥ 1 is always the ratio of the long to the short dimension:
///
/// * `Needle` -- prolate spheroid with semi-axes (r, r, αr)
/// * `Plate` -- oblate spheroid with semi-axes (αr, αr, r)
/// * `Cuboidal` -- square prism with cross-section edge r and length αr
/// * `Sphere` -- radius r (the aspect ratio is ignored)
///
/// Here r is the short-axis radius (or the cross-section edge of the prism).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Morphology {
    Sphere,
    Needle,
    Plate,
    Cuboidal,
}

impl Morphology {
    /// Indicates whether the morphology has a free shape parameter (needle and plate)
    pub fn has_free_shape(&self) -> bool {
        matches!(self, Morphology::Needle | Morphology::Plate)
    }

    /// Returns the ratio R_sph / r between the equivalent spherical radius and the short-axis radius
    ///
    /// ```text
    /// needle:    R_sph = α^(1/3) r
    /// plate:     R_sph = α^(2/3) r
    /// cuboidal:  R_sph = (3α / 4π)^(1/3) r
    /// sphere:    R_sph = r
    /// ```
    pub fn radius_ratio(&self, aspect_ratio: f64) -> Result<f64> {
        let alpha = check_aspect_ratio(aspect_ratio)?;
        let res = match self {
            Morphology::Sphere => 1.0,
            Morphology::Needle => f64::cbrt(alpha),
            Morphology::Plate => f64::cbrt(alpha * alpha),
            Morphology::Cuboidal => f64::cbrt(alpha / FOUR_PI_BY_3),
        };
        Ok(res)
    }

    /// Calculates the equivalent spherical radius (same volume) from the short-axis radius
    pub fn equivalent_radius(&self, short_radius: f64, aspect_ratio: f64) -> Result<f64> {
        check_radius("short-axis radius", short_radius)?;
        Ok(self.radius_ratio(aspect_ratio)? * short_radius)
    }

    /// Calculates the short-axis radius from the equivalent spherical radius
    pub fn short_radius(&self, equivalent_radius: f64, aspect_ratio: f64) -> Result<f64> {
        check_radius("equivalent spherical radius", equivalent_radius)?;
        Ok(equivalent_radius / self.radius_ratio(aspect_ratio)?)
    }

    /// Calculates the Gibbs-Thomson correction g(α)
    ///
    /// g(α) is the ratio between the surface area of the precipitate and the surface area of
    /// the sphere with the same volume. With `e = √(1 - 1/α²)`:
    ///
    /// ```text
    ///              1 + α asin(e)/e                      α² + atanh(e)/e                     1 + 2α
    /// needle: g = ─────────────────       plate: g = ─────────────────      cuboidal: g = ──────────
    ///                 2 α^(2/3)                          2 α^(4/3)                          3 α^(2/3)
    /// ```
    ///
    /// The cuboidal factor is normalized by the cube. All factors are exactly 1 at α = 1.
    pub fn gibbs_thomson_factor(&self, aspect_ratio: f64) -> Result<f64> {
        let alpha = check_aspect_ratio(aspect_ratio)?;
        if alpha == 1.0 {
            return Ok(1.0);
        }
        let e = eccentricity(alpha);
        let res = match self {
            Morphology::Sphere => 1.0,
            Morphology::Needle => (1.0 + alpha * asin_by_x(e)) / (2.0 * f64::powf(alpha, 2.0 / 3.0)),
            Morphology::Plate => (alpha * alpha + atanh_by_x(e)) / (2.0 * f64::powf(alpha, 4.0 / 3.0)),
            Morphology::Cuboidal => (1.0 + 2.0 * alpha) / (3.0 * f64::powf(alpha, 2.0 / 3.0)),
        };
        Ok(res)
    }

    /// Calculates the growth-rate correction f(α)
    ///
    /// f(α) is the ratio between the diffusion capacitance of the precipitate and the capacitance
    /// of the sphere with the same volume:
    ///
    /// ```text
    ///                        e                               e
    /// needle: f = α^(2/3) ──────────      plate: f = α^(1/3) ───────
    ///                      atanh(e)                          asin(e)
    /// ```
    ///
    /// Cuboidal precipitates use the needle expression. All factors are exactly 1 at α = 1.
    pub fn growth_rate_factor(&self, aspect_ratio: f64) -> Result<f64> {
        let alpha = check_aspect_ratio(aspect_ratio)?;
        if alpha == 1.0 {
            return Ok(1.0);
        }
        let e = eccentricity(alpha);
        let res = match self {
            Morphology::Sphere => 1.0,
            Morphology::Needle | Morphology::Cuboidal => f64::powf(alpha, 2.0 / 3.0) / atanh_by_x(e),
            Morphology::Plate => f64::cbrt(alpha) / asin_by_x(e),
        };
        Ok(res)
    }
}

impl fmt::Display for Morphology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Morphology::Sphere => "sphere",
            Morphology::Needle => "needle",
            Morphology::Plate => "plate",
            Morphology::Cuboidal => "cuboidal",
        };
        write!(f, "{}", name)
    }
}

/// Checks the aspect ratio (must be finite and ≥ 1)
pub(crate) fn check_aspect_ratio(aspect_ratio: f64) -> Result<f64> {
    if !aspect_ratio.is_finite() || aspect_ratio < 1.0 {
        return Err(Error::InvalidInput(format!(
            "aspect ratio must be finite and ≥ 1 (got {})",
            aspect_ratio
        )));
    }
    Ok(aspect_ratio)
}

/// Checks a radius (must be finite and > 0)
pub(crate) fn check_radius(name: &str, radius: f64) -> Result<f64> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(Error::InvalidInput(format!("{} must be finite and > 0 (got {})", name, radius)));
    }
    Ok(radius)
}

/// Returns the eccentricity e = √(1 - 1/α²)
fn eccentricity(alpha: f64) -> f64 {
    f64::sqrt(1.0 - 1.0 / (alpha * alpha))
}

/// Returns asin(e)/e
fn asin_by_x(e: f64) -> f64 {
    if e < SERIES_ECCENTRICITY {
        1.0 + e * e / 6.0
    } else {
        f64::asin(e) / e
    }
}

/// Returns atanh(e)/e
fn atanh_by_x(e: f64) -> f64 {
    if e < SERIES_ECCENTRICITY {
        1.0 + e * e / 3.0
    } else {
        f64::atanh(e) / e
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Morphology;
    use crate::base::Error;
    use russell_lab::approx_eq;

    const ALL: [Morphology; 4] = [
        Morphology::Sphere,
        Morphology::Needle,
        Morphology::Plate,
        Morphology::Cuboidal,
    ];

    #[test]
    fn unit_aspect_ratio_gives_sphere_factors() {
        for m in ALL {
            assert_eq!(m.gibbs_thomson_factor(1.0).unwrap(), 1.0);
            assert_eq!(m.growth_rate_factor(1.0).unwrap(), 1.0);
        }
        assert_eq!(Morphology::Needle.equivalent_radius(2.0, 1.0).unwrap(), 2.0);
        assert_eq!(Morphology::Plate.equivalent_radius(2.0, 1.0).unwrap(), 2.0);
        assert_eq!(Morphology::Sphere.equivalent_radius(2.0, 7.0).unwrap(), 2.0);
    }

    #[test]
    fn radius_conversion_works() {
        approx_eq(Morphology::Needle.equivalent_radius(1.0, 8.0).unwrap(), 2.0, 1e-15);
        approx_eq(Morphology::Plate.equivalent_radius(1.0, 8.0).unwrap(), 4.0, 1e-15);
        let pi = std::f64::consts::PI;
        approx_eq(
            Morphology::Cuboidal.equivalent_radius(1.0, 4.0 * pi / 3.0).unwrap(),
            1.0,
            1e-15,
        );
        // round trip
        for m in ALL {
            for alpha in [1.0, 1.5, 3.7, 20.0, 50.0] {
                for rr in [1e-10, 4e-9, 3e-8] {
                    let r = m.short_radius(rr, alpha).unwrap();
                    approx_eq(m.equivalent_radius(r, alpha).unwrap(), rr, 1e-15 * rr);
                }
            }
        }
    }

    #[test]
    fn shape_factors_work() {
        // needle with α = 2: e = √3/2, asin(e) = π/3
        let pi = std::f64::consts::PI;
        let e = f64::sqrt(3.0) / 2.0;
        let g = (1.0 + 2.0 * (pi / 3.0) / e) / (2.0 * f64::powf(2.0, 2.0 / 3.0));
        approx_eq(Morphology::Needle.gibbs_thomson_factor(2.0).unwrap(), g, 1e-14);
        let f = f64::powf(2.0, 2.0 / 3.0) * e / f64::atanh(e);
        approx_eq(Morphology::Needle.growth_rate_factor(2.0).unwrap(), f, 1e-14);
        approx_eq(Morphology::Cuboidal.growth_rate_factor(2.0).unwrap(), f, 1e-14);
        // plate with α = 2
        let g = (4.0 + f64::atanh(e) / e) / (2.0 * f64::powf(2.0, 4.0 / 3.0));
        approx_eq(Morphology::Plate.gibbs_thomson_factor(2.0).unwrap(), g, 1e-14);
        let f = f64::cbrt(2.0) * e / (pi / 3.0);
        approx_eq(Morphology::Plate.growth_rate_factor(2.0).unwrap(), f, 1e-14);
        // cuboid: area of the prism over the area of the cube with the same volume
        let g = (2.0 + 4.0 * 3.0) / (6.0 * f64::powf(3.0, 2.0 / 3.0));
        approx_eq(Morphology::Cuboidal.gibbs_thomson_factor(3.0).unwrap(), g, 1e-14);
        // sphere ignores α
        assert_eq!(Morphology::Sphere.gibbs_thomson_factor(5.0).unwrap(), 1.0);
        assert_eq!(Morphology::Sphere.growth_rate_factor(5.0).unwrap(), 1.0);
    }

    #[test]
    fn shape_factors_are_continuous_near_one() {
        for m in ALL {
            for alpha in [1.0 + 1e-12, 1.0 + 1e-9, 1.0 + 1e-6] {
                approx_eq(m.gibbs_thomson_factor(alpha).unwrap(), 1.0, 1e-5);
                approx_eq(m.growth_rate_factor(alpha).unwrap(), 1.0, 1e-5);
            }
        }
        // non-spherical shapes have more surface than the equivalent sphere
        for m in [Morphology::Needle, Morphology::Plate] {
            let mut previous = 1.0;
            for alpha in [1.1, 2.0, 5.0, 10.0, 50.0] {
                let g = m.gibbs_thomson_factor(alpha).unwrap();
                assert!(g > previous);
                previous = g;
            }
        }
    }

    #[test]
    fn functions_capture_errors() {
        for m in ALL {
            assert!(matches!(m.gibbs_thomson_factor(0.5), Err(Error::InvalidInput(_))));
            assert!(matches!(m.growth_rate_factor(f64::NAN), Err(Error::InvalidInput(_))));
            assert!(matches!(m.equivalent_radius(0.0, 2.0), Err(Error::InvalidInput(_))));
            assert!(matches!(m.short_radius(-1.0, 2.0), Err(Error::InvalidInput(_))));
            assert!(matches!(m.short_radius(1.0, f64::INFINITY), Err(Error::InvalidInput(_))));
        }
    }

    #[test]
    fn serde_and_display_work() {
        let json = serde_json::to_string(&Morphology::Plate).unwrap();
        assert_eq!(json, "\"plate\"");
        let m: Morphology = serde_json::from_str("\"cuboidal\"").unwrap();
        assert_eq!(m, Morphology::Cuboidal);
        assert_eq!(format!("{}", Morphology::Needle), "needle");
        assert!(Morphology::Needle.has_free_shape());
        assert!(!Morphology::Cuboidal.has_free_shape());
    }
}
