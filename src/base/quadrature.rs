use super::{Error, Result};
use russell_lab::math::PI;
use serde::{Deserialize, Serialize};

/// Holds the parameters of the quadrature rules over the unit sphere
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuadratureParams {
    /// Number of Gauss-Legendre points per polar-angle panel
    pub panel_order: usize,

    /// Number of geometrically graded panels on each side of the critical polar angle
    pub grading_levels: usize,

    /// Number of midpoint-rule points along the azimuth
    pub n_azimuth: usize,

    /// Number of Gauss-Legendre points per direction on each cubed-sphere triangle
    pub cubed_sphere_order: usize,
}

impl QuadratureParams {
    /// Allocates a new instance with default values
    pub fn new() -> Self {
        QuadratureParams {
            panel_order: 12,
            grading_levels: 8,
            n_azimuth: 48,
            cubed_sphere_order: 20,
        }
    }

    /// Validates the parameters
    pub fn validate(&self) -> Result<()> {
        if self.panel_order < 2 || self.panel_order > 64 {
            return Err(Error::Configuration("panel_order must be in [2, 64]".to_string()));
        }
        if self.grading_levels > 30 {
            return Err(Error::Configuration("grading_levels must be ≤ 30".to_string()));
        }
        if self.n_azimuth < 4 {
            return Err(Error::Configuration("n_azimuth must be ≥ 4".to_string()));
        }
        if self.cubed_sphere_order < 2 || self.cubed_sphere_order > 64 {
            return Err(Error::Configuration("cubed_sphere_order must be in [2, 64]".to_string()));
        }
        Ok(())
    }
}

impl Default for QuadratureParams {
    fn default() -> Self {
        QuadratureParams::new()
    }
}

/// Computes the Gauss-Legendre points and weights on [-1, 1]
///
/// The points are returned in decreasing order.
pub fn gauss_legendre(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut points = vec![0.0; n];
    let mut weights = vec![0.0; n];
    let nf = n as f64;
    for k in 0..n {
        // Tricomi's initial guess followed by Newton iterations on P_n
        let mut x = f64::cos(PI * ((k + 1) as f64 - 0.25) / (nf + 0.5));
        let mut dp = 1.0;
        for _ in 0..100 {
            let (mut p0, mut p1) = (1.0, x);
            for m in 2..=n {
                let mf = m as f64;
                let p2 = ((2.0 * mf - 1.0) * x * p1 - (mf - 1.0) * p0) / mf;
                p0 = p1;
                p1 = p2;
            }
            dp = nf * (x * p1 - p0) / (x * x - 1.0);
            let dx = p1 / dp;
            x -= dx;
            if f64::abs(dx) < 1e-15 {
                break;
            }
        }
        points[k] = x;
        weights[k] = 2.0 / ((1.0 - x * x) * dp * dp);
    }
    (points, weights)
}

/// Holds a set of directions on the unit sphere with weights normalized to the sphere area
///
/// ```text
///  1   ⌠              n
/// ─── │ f(ζ) dS  ≈   Σ  wᵢ f(ζᵢ)
///  4π  ⌡|ζ|=1        i=1
/// ```
#[derive(Clone, Debug)]
pub struct SphereRule {
    /// Unit directions
    pub directions: Vec<[f64; 3]>,

    /// Weights (sum to one)
    pub weights: Vec<f64>,
}

impl SphereRule {
    /// Allocates a rule over the upper hemisphere with polar panels graded around the critical angle
    ///
    /// The rule is meant for even integrands (f(-ζ) = f(ζ)); the weights already account for
    /// the lower hemisphere. The critical angle `θc = atan(√(a₁a₂)/a₃)` is where the mapped
    /// direction `ξᵢ = ζᵢ/aᵢ` turns from the x₃ axis towards the x₁x₂ plane; for needles and
    /// plates the integrand varies over a polar width of order 1/α around it.
    pub fn graded_hemisphere(semi_axes: &[f64; 3], params: &QuadratureParams) -> Self {
        let half_pi = PI / 2.0;
        let theta_c = f64::atan(f64::sqrt(semi_axes[0] * semi_axes[1]) / semi_axes[2]);
        let mut breaks = vec![0.0, theta_c, half_pi];
        let mut factor = 1.0;
        for _ in 0..params.grading_levels {
            factor *= 0.5;
            breaks.push(theta_c * factor);
            breaks.push(half_pi - (half_pi - theta_c) * factor);
        }
        breaks.sort_by(|a, b| a.total_cmp(b));
        breaks.dedup_by(|a, b| f64::abs(*a - *b) < 1e-15);

        let (xs, ws) = gauss_legendre(params.panel_order);
        let n_az = params.n_azimuth;
        let d_omega = 2.0 * PI / (n_az as f64);
        let capacity = (breaks.len() - 1) * xs.len() * n_az;
        let mut directions = Vec::with_capacity(capacity);
        let mut weights = Vec::with_capacity(capacity);
        for p in 0..(breaks.len() - 1) {
            let (t0, t1) = (breaks[p], breaks[p + 1]);
            let half = 0.5 * (t1 - t0);
            for (x, w) in xs.iter().zip(ws.iter()) {
                let theta = 0.5 * (t0 + t1) + half * x;
                let (sin_t, cos_t) = f64::sin_cos(theta);
                let weight = half * w * sin_t / (n_az as f64);
                for j in 0..n_az {
                    let omega = (j as f64 + 0.5) * d_omega;
                    let (sin_o, cos_o) = f64::sin_cos(omega);
                    directions.push([sin_t * cos_o, sin_t * sin_o, cos_t]);
                    weights.push(weight);
                }
            }
        }
        SphereRule { directions, weights }
    }

    /// Allocates a rule over the whole sphere based on the six faces of a cube
    ///
    /// Each face is split into four quadrants at the face center and each quadrant into two
    /// triangles collapsed at the face center (Duffy transformation). This removes the
    /// `1/ρ` singularity that box shape functions exhibit along the face normals. The quadrant
    /// boundaries also follow the coordinate planes, where these integrands have kinks.
    pub fn cubed_sphere(order: usize) -> Self {
        let (xs, ws) = gauss_legendre(order);
        let s: Vec<f64> = xs.iter().map(|x| 0.5 * (x + 1.0)).collect();
        let w: Vec<f64> = ws.iter().map(|w| 0.5 * w).collect();
        let capacity = 6 * 4 * 2 * order * order;
        let mut directions = Vec::with_capacity(capacity);
        let mut weights = Vec::with_capacity(capacity);
        for axis in 0..3 {
            for sign in [1.0, -1.0] {
                for su in [1.0, -1.0] {
                    for sv in [1.0, -1.0] {
                        for swap in [false, true] {
                            for (p, wp) in s.iter().zip(w.iter()) {
                                for (q, wq) in s.iter().zip(w.iter()) {
                                    let (mut u, mut v) = (*p, p * q);
                                    if swap {
                                        std::mem::swap(&mut u, &mut v);
                                    }
                                    u *= su;
                                    v *= sv;
                                    let mut point = [0.0; 3];
                                    point[axis] = sign;
                                    point[(axis + 1) % 3] = u;
                                    point[(axis + 2) % 3] = v;
                                    let r = f64::sqrt(1.0 + u * u + v * v);
                                    directions.push([point[0] / r, point[1] / r, point[2] / r]);
                                    weights.push(p * wp * wq / (r * r * r) / (4.0 * PI));
                                }
                            }
                        }
                    }
                }
            }
        }
        SphereRule { directions, weights }
    }

    /// Returns the number of directions
    pub fn len(&self) -> usize {
        self.directions.len()
    }

    /// Indicates whether the rule is empty
    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    /// Computes the normalized integral (the mean value over the sphere) of f
    pub fn mean<F>(&self, mut f: F) -> f64
    where
        F: FnMut(&[f64; 3]) -> f64,
    {
        self.directions
            .iter()
            .zip(self.weights.iter())
            .fold(0.0, |acc, (d, w)| acc + w * f(d))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
