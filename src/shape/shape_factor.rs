use super::{check_radius, AspectRatio, Morphology};
use crate::base::{Error, Result, FOUR_PI_BY_3};
use russell_lab::RootFinder;

/// Defines the maximum number of times the lower bracket is halved before giving up
const MAX_BRACKET_HALVINGS: usize = 200;

/// Implements the geometric corrections for non-spherical precipitates
///
/// Combines a morphology with a (possibly radius-dependent) aspect ratio and maps between the
/// equivalent spherical radius R_sph and the short-axis radius r. When the aspect ratio depends on
/// r, the conversion `R_sph → r` is self-consistent: r solves `R(r, α(r)) = R_sph`.
#[derive(Clone, Debug)]
pub struct ShapeFactor {
    /// Holds the morphology
    pub morphology: Morphology,

    /// Holds the aspect ratio
    pub aspect_ratio: AspectRatio,
}

impl ShapeFactor {
    /// Allocates a new instance
    pub fn new(morphology: Morphology, aspect_ratio: AspectRatio) -> Self {
        ShapeFactor {
            morphology,
            aspect_ratio,
        }
    }

    /// Allocates a new instance for spherical precipitates
    pub fn sphere() -> Self {
        ShapeFactor::new(Morphology::Sphere, AspectRatio::Constant(1.0))
    }

    /// Returns the aspect ratio at the short-axis radius r
    pub fn aspect_ratio_at(&self, short_radius: f64) -> Result<f64> {
        if self.morphology == Morphology::Sphere {
            return Ok(1.0);
        }
        self.aspect_ratio.value(short_radius)
    }

    /// Calculates the equivalent spherical radius from the short-axis radius
    pub fn equivalent_radius(&self, short_radius: f64) -> Result<f64> {
        check_radius("short-axis radius", short_radius)?;
        let alpha = self.aspect_ratio_at(short_radius)?;
        self.morphology.equivalent_radius(short_radius, alpha)
    }

    /// Calculates the short-axis radius from the equivalent spherical radius
    pub fn short_radius(&self, equivalent_radius: f64) -> Result<f64> {
        check_radius("equivalent spherical radius", equivalent_radius)?;
        match (&self.aspect_ratio, self.morphology) {
            (_, Morphology::Sphere) => Ok(equivalent_radius),
            (AspectRatio::Constant(alpha), _) => self.morphology.short_radius(equivalent_radius, *alpha),
            (AspectRatio::Function(_), _) => self.solve_short_radius(equivalent_radius),
        }
    }

    /// Returns the aspect ratio of a precipitate with the given equivalent spherical radius
    pub fn aspect_ratio_of(&self, equivalent_radius: f64) -> Result<f64> {
        let r = self.short_radius(equivalent_radius)?;
        self.aspect_ratio_at(r)
    }

    /// Calculates the Gibbs-Thomson correction g(α) for the given equivalent spherical radius
    pub fn gibbs_thomson(&self, equivalent_radius: f64) -> Result<f64> {
        let alpha = self.aspect_ratio_of(equivalent_radius)?;
        self.morphology.gibbs_thomson_factor(alpha)
    }

    /// Calculates the growth-rate correction f(α) for the given equivalent spherical radius
    pub fn growth_rate(&self, equivalent_radius: f64) -> Result<f64> {
        let alpha = self.aspect_ratio_of(equivalent_radius)?;
        self.morphology.growth_rate_factor(alpha)
    }

    /// Solves `R(r, α(r)) - R_sph = 0` for r using Brent's method
    ///
    /// The radius is normalized by R_sph. Since α ≥ 1, the root is at most `R_sph` for needles
    /// and plates and at most `(4π/3)^(1/3) R_sph` for cuboids. The lower bracket is halved until
    /// the residual becomes negative.
    fn solve_short_radius(&self, equivalent_radius: f64) -> Result<f64> {
        let residual = |x: f64| -> Result<f64> {
            let rr = self.equivalent_radius(x * equivalent_radius)?;
            Ok(rr / equivalent_radius - 1.0)
        };
        let x_max = match self.morphology {
            Morphology::Cuboidal => f64::cbrt(FOUR_PI_BY_3),
            _ => 1.0,
        };
        let f_max = residual(x_max)?;
        if f_max == 0.0 {
            return Ok(x_max * equivalent_radius);
        }
        if f_max < 0.0 {
            return Err(Error::NumericalNonConvergence(
                "cannot bracket the short-axis radius; is the aspect-ratio function ≥ 1?".to_string(),
            ));
        }
        let mut x_min = 0.5 * x_max;
        let mut count = 0;
        loop {
            let f_min = residual(x_min)?;
            if f_min == 0.0 {
                return Ok(x_min * equivalent_radius);
            }
            if f_min < 0.0 {
                break;
            }
            count += 1;
            if count == MAX_BRACKET_HALVINGS {
                return Err(Error::NumericalNonConvergence(
                    "cannot bracket the short-axis radius; is the aspect-ratio function monotonic?".to_string(),
                ));
            }
            x_min *= 0.5;
        }
        let solver = RootFinder::new();
        let mut status = Ok(());
        let res = solver.brent(x_min, x_max, &mut 0, |x, _| {
            residual(x).map_err(|e| {
                status = Err(e);
                "the aspect-ratio function returned an invalid value"
            })
        });
        status?;
        let (x, _) = res?;
        Ok(x * equivalent_radius)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::ShapeFactor;
    use crate::base::Error;
    use crate::shape::{AspectRatio, Morphology};
    use russell_lab::approx_eq;

    #[test]
    fn constant_aspect_ratio_works() {
        let sf = ShapeFactor::new(Morphology::Needle, AspectRatio::Constant(8.0));
        approx_eq(sf.short_radius(2e-9).unwrap(), 1e-9, 1e-24);
        approx_eq(sf.equivalent_radius(1e-9).unwrap(), 2e-9, 1e-24);
        assert_eq!(sf.aspect_ratio_at(1.0).unwrap(), 8.0);
        assert_eq!(
            sf.gibbs_thomson(2e-9).unwrap(),
            Morphology::Needle.gibbs_thomson_factor(8.0).unwrap()
        );
        assert_eq!(
            sf.growth_rate(2e-9).unwrap(),
            Morphology::Needle.growth_rate_factor(8.0).unwrap()
        );
    }

    #[test]
    fn sphere_works() {
        let sf = ShapeFactor::sphere();
        assert_eq!(sf.short_radius(3e-9).unwrap(), 3e-9);
        assert_eq!(sf.equivalent_radius(3e-9).unwrap(), 3e-9);
        assert_eq!(sf.gibbs_thomson(3e-9).unwrap(), 1.0);
        assert_eq!(sf.growth_rate(3e-9).unwrap(), 1.0);
    }

    #[test]
    fn radius_dependent_aspect_ratio_works() {
        let r0 = 1e-9;
        for morphology in [Morphology::Needle, Morphology::Plate, Morphology::Cuboidal] {
            let sf = ShapeFactor::new(morphology, AspectRatio::function(move |r| 1.0 + r / r0));
            for rr in [1e-10, 1e-9, 5e-9, 4e-8] {
                let r = sf.short_radius(rr).unwrap();
                approx_eq(sf.equivalent_radius(r).unwrap() / rr, 1.0, 1e-8);
                let alpha = sf.aspect_ratio_at(r).unwrap();
                approx_eq(sf.aspect_ratio_of(rr).unwrap(), alpha, 1e-15);
                assert!(alpha >= 1.0);
            }
        }
        // aspect ratio saturating at 1 for small radii
        let sf = ShapeFactor::new(Morphology::Plate, AspectRatio::function(|r| f64::max(1.0, r / 1e-9)));
        let r = sf.short_radius(5e-10).unwrap();
        approx_eq(r / 5e-10, 1.0, 1e-10);
    }

    #[test]
    fn functions_capture_errors() {
        let sf = ShapeFactor::new(Morphology::Plate, AspectRatio::Constant(2.0));
        assert!(matches!(sf.short_radius(0.0), Err(Error::InvalidInput(_))));
        assert!(matches!(sf.equivalent_radius(-1.0), Err(Error::InvalidInput(_))));
        assert!(matches!(sf.gibbs_thomson(f64::NAN), Err(Error::InvalidInput(_))));
        let sf = ShapeFactor::new(Morphology::Plate, AspectRatio::Constant(0.9));
        assert!(matches!(sf.growth_rate(1e-9), Err(Error::InvalidInput(_))));
        // function returning values below one
        let sf = ShapeFactor::new(Morphology::Needle, AspectRatio::function(|_| 0.5));
        assert!(sf.short_radius(1e-9).is_err());
        // valid at the bracket ends but below one where the root lies
        let sf = ShapeFactor::new(
            Morphology::Needle,
            AspectRatio::function(|r| if r >= 0.9e-9 || r <= 0.55e-9 { 2.0 } else { 0.5 }),
        );
        assert!(matches!(sf.short_radius(1e-9), Err(Error::InvalidInput(_))));
        assert!(matches!(sf.gibbs_thomson(1e-9), Err(Error::InvalidInput(_))));
    }
}
