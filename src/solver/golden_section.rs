use crate::base::{Error, Result};

/// Defines 1/φ = (√5 - 1)/2 where φ is the golden ratio
const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Holds the results of a golden-section search
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GoldenSectionResult {
    /// Holds the minimizer
    pub x: f64,

    /// Holds the minimum value
    pub f: f64,

    /// Holds the number of iterations
    pub iterations: usize,

    /// Indicates that the minimizer is the lower bound
    pub at_lower: bool,

    /// Indicates that the minimizer is the upper bound
    pub at_upper: bool,
}

/// Minimizes a unimodal function in [lower, upper] using the golden-section search
///
/// The search stops when the bracket width is smaller than `tolerance` times the magnitude of
/// its midpoint. The interior points never reach the bounds; hence, when the final bracket still
/// touches a bound, the function is also evaluated at that bound and the bound is returned
/// (exactly) if it is not worse than the interior minimizer.
///
/// Returns `NumericalNonConvergence` if the bracket does not shrink within `max_iterations`.
pub fn golden_section<F>(
    lower: f64,
    upper: f64,
    tolerance: f64,
    max_iterations: usize,
    mut f: F,
) -> Result<GoldenSectionResult>
where
    F: FnMut(f64) -> Result<f64>,
{
    if !lower.is_finite() || !upper.is_finite() || lower >= upper {
        return Err(Error::InvalidInput(format!(
            "the search interval [{}, {}] is invalid",
            lower, upper
        )));
    }
    let (mut a, mut b) = (lower, upper);
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut fc = f(c)?;
    let mut fd = f(d)?;
    let mut iterations = 0;
    while (b - a) > tolerance * 0.5 * (f64::abs(a) + f64::abs(b)) {
        if iterations == max_iterations {
            return Err(Error::NumericalNonConvergence(format!(
                "golden-section search did not converge after {} iterations; bracket = [{}, {}]",
                max_iterations, a, b
            )));
        }
        iterations += 1;
        if fc <= fd {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = f(c)?;
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = f(d)?;
        }
    }
    let (mut x, mut fx) = if fc <= fd { (c, fc) } else { (d, fd) };
    let (mut at_lower, mut at_upper) = (false, false);
    if a == lower {
        let f_lower = f(lower)?;
        if f_lower <= fx {
            (x, fx, at_lower) = (lower, f_lower, true);
        }
    }
    if b == upper {
        let f_upper = f(upper)?;
        if f_upper < fx {
            (x, fx, at_lower, at_upper) = (upper, f_upper, false, true);
        }
    }
    Ok(GoldenSectionResult {
        x,
        f: fx,
        iterations,
        at_lower,
        at_upper,
    })
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::golden_section;
    use crate::base::Error;
    use russell_lab::approx_eq;

    #[test]
    fn golden_section_works() {
        let mut count = 0;
        let res = golden_section(1.0, 50.0, 1e-8, 200, |x| {
            count += 1;
            Ok((x - 3.7) * (x - 3.7) + 2.0)
        })
        .unwrap();
        approx_eq(res.x, 3.7, 1e-7);
        approx_eq(res.f, 2.0, 1e-13);
        assert!(!res.at_lower);
        assert!(!res.at_upper);
        assert!(res.iterations < 60);
        assert_eq!(count, res.iterations + 2);
    }

    #[test]
    fn golden_section_returns_exact_bounds() {
        let res = golden_section(1.0, 50.0, 1e-5, 200, |x| Ok(x * x)).unwrap();
        assert_eq!(res.x, 1.0);
        assert!(res.at_lower);
        let res = golden_section(1.0, 50.0, 1e-5, 200, |x| Ok(-x)).unwrap();
        assert_eq!(res.x, 50.0);
        assert!(res.at_upper);
    }

    #[test]
    fn golden_section_captures_errors() {
        assert!(matches!(
            golden_section(1.0, 50.0, 1e-5, 3, |x| Ok((x - 3.7) * (x - 3.7))),
            Err(Error::NumericalNonConvergence(_))
        ));
        assert!(matches!(
            golden_section(2.0, 1.0, 1e-5, 200, |x| Ok(x)),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            golden_section(1.0, 2.0, 1e-5, 200, |_| Err(Error::InvalidInput("stop".to_string()))),
            Err(Error::InvalidInput(_))
        ));
    }
}
