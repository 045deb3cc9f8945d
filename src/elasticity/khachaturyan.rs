use super::{inverse_3x3, ElasticConstants, Inclusion};
use crate::base::{Error, QuadratureParams, Result, SphereRule, AXES_TOLERANCE};
use russell_lab::math::PI;

/// Calculates the elastic energy of a coherent inclusion with Khachaturyan's microelasticity theory
///
/// The matrix and the inclusion share the same stiffness. In reciprocal space:
///
/// ```text
///       1  ⌠
/// E = ──── │  B(n) w(n) dS(n)        B(n) = σ* : ε* - n·σ*·Ω(n)·σ*·n
///       2  ⌡|n|=1
/// ```
///
/// where `σ* = C : ε*`, `Ω(n) = K⁻¹(n)` is the inverse of the acoustic tensor, and w(n) is the
/// radial integral of the squared Fourier transform of the shape function along the direction n,
/// normalized such that `∫ w dS = V`.
///
/// * Ellipsoid: the integral is rewritten over the mapped directions of the unit sphere, which
///   yields `E = (V/2) ⟨B(n(ζ))⟩` with `nᵢ ∝ ζᵢ / aᵢ`.
/// * Sphere in an isotropic matrix: the orientation average is evaluated exactly.
/// * Cuboid: the radial integral of the box shape function is evaluated in closed form and
///   integrated over a cubed-sphere rule.
///
/// The applied-stress term is not included here.
pub fn khachaturyan_energy(
    matrix: &ElasticConstants,
    eigenstrain: &[[f64; 3]; 3],
    inclusion: &Inclusion,
    params: &QuadratureParams,
) -> Result<f64> {
    inclusion.validate()?;
    params.validate()?;
    let sig = matrix.stress(eigenstrain);
    let sig_eps = double_dot(&sig, eigenstrain);
    let volume = inclusion.volume();
    match inclusion {
        Inclusion::Ellipsoid { semi_axes } => {
            if let (Some((lambda, mu)), true) = (matrix.isotropic_lame(), is_sphere(semi_axes)) {
                let tr = sig[0][0] + sig[1][1] + sig[2][2];
                let tr2 = double_dot(&sig, &sig);
                let c = (lambda + mu) / (lambda + 2.0 * mu);
                let mean_b = sig_eps - (tr2 / 3.0 - c * (tr * tr + 2.0 * tr2) / 15.0) / mu;
                return Ok(0.5 * volume * mean_b);
            }
            let rule = SphereRule::graded_hemisphere(semi_axes, params);
            let mut status = Ok(());
            let mean_b = rule.mean(|zeta| {
                let n = [zeta[0] / semi_axes[0], zeta[1] / semi_axes[1], zeta[2] / semi_axes[2]];
                kernel(matrix, &sig, sig_eps, &n).unwrap_or_else(|e| {
                    status = Err(e);
                    0.0
                })
            });
            status?;
            Ok(0.5 * volume * mean_b)
        }
        Inclusion::Cuboid { half_edges } => {
            let rule = SphereRule::cubed_sphere(params.cubed_sphere_order);
            let mut status = Ok(());
            let mean_bw = rule.mean(|n| {
                let b = kernel(matrix, &sig, sig_eps, n).unwrap_or_else(|e| {
                    status = Err(e);
                    0.0
                });
                b * cuboid_shape_weight(n, half_edges)
            });
            status?;
            Ok(0.5 * 4.0 * PI * mean_bw)
        }
    }
}

/// Calculates the shape weight w(n) of a box with half-edges l along the unit direction n
///
/// The Fourier transform of the box indicator is `θ(k) = Π 2 sin(lᵢkᵢ)/kᵢ`. Thus, with `aᵢ = |nᵢ| lᵢ`:
///
/// ```text
///            1     ⌠∞                     64 (l₁l₂l₃)²   ⌠∞  sin²(a₁k) sin²(a₂k) sin²(a₃k)
/// w(n) = ───────── │  |θ(kn)|² k² dk  =  ──────────── │   ─────────────────────────── dk
///         (2π)³    ⌡0                     (2π)³ (a₁a₂a₃)² ⌡0              k⁴
/// ```
///
/// The remaining radial integral has the closed form (a₁ ≤ a₂ ≤ a₃)
///
/// ```text
///  ⌠∞  sin²(a₁k) sin²(a₂k) sin²(a₃k)       π   ⎡                 1               ⎤
///  │   ─────────────────────────── dk  =  ─── ⎢ a₁²(3a₂ - a₁) - ─── max(0, m)³ ⎥,   m = a₁ + a₂ - a₃
///  ⌡0              k⁴                      12  ⎣                 2               ⎦
/// ```
///
/// which is divided by (a₁a₂a₃)² without cancellation.
pub fn cuboid_shape_weight(n: &[f64; 3], half_edges: &[f64; 3]) -> f64 {
    let mut a = [
        f64::abs(n[0]) * half_edges[0],
        f64::abs(n[1]) * half_edges[1],
        f64::abs(n[2]) * half_edges[2],
    ];
    a.sort_by(|x, y| x.total_cmp(y));
    let [a1, a2, a3] = a;
    if a2 <= 0.0 {
        return 0.0;
    }
    let m = a1 + a2 - a3;
    let corner = if m > 0.0 { 0.5 * (m / a1) * (m / a1) * m } else { 0.0 };
    let ratio = PI / 12.0 * ((3.0 * a2 - a1) - corner) / (a2 * a2 * a3 * a3);
    let vol = half_edges[0] * half_edges[1] * half_edges[2];
    64.0 * vol * vol * ratio / f64::powi(2.0 * PI, 3)
}

/// Evaluates B(n) = σ*:ε* - n·σ*·Ω(n)·σ*·n for a (not necessarily unit) direction n
fn kernel(matrix: &ElasticConstants, sig: &[[f64; 3]; 3], sig_eps: f64, n: &[f64; 3]) -> Result<f64> {
    let norm = f64::sqrt(n[0] * n[0] + n[1] * n[1] + n[2] * n[2]);
    let n = [n[0] / norm, n[1] / norm, n[2] / norm];
    let omega = inverse_3x3(&matrix.acoustic_tensor(&n)).ok_or(Error::Linalg("acoustic tensor is singular"))?;
    let mut v = [0.0; 3];
    for i in 0..3 {
        for j in 0..3 {
            v[i] += sig[i][j] * n[j];
        }
    }
    let mut res = 0.0;
    for i in 0..3 {
        for j in 0..3 {
            res += v[i] * omega[i][j] * v[j];
        }
    }
    Ok(sig_eps - res)
}

/// Returns a : b
fn double_dot(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> f64 {
    let mut res = 0.0;
    for i in 0..3 {
        for j in 0..3 {
            res += a[i][j] * b[i][j];
        }
    }
    res
}

fn is_sphere(semi_axes: &[f64; 3]) -> bool {
    let max = semi_axes.iter().fold(0.0_f64, |acc, a| f64::max(acc, *a));
    let min = semi_axes.iter().fold(f64::INFINITY, |acc, a| f64::min(acc, *a));
    max - min <= AXES_TOLERANCE * max
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{cuboid_shape_weight, khachaturyan_energy};
    use crate::base::{Error, QuadratureParams, SphereRule};
    use crate::elasticity::{ElasticConstants, ElasticModuli, Inclusion};
    use russell_lab::{approx_eq, math::PI};

    fn isotropic() -> ElasticConstants {
        ElasticConstants::from_moduli(&ElasticModuli::shear_poisson(57.1e9, 0.33)).unwrap()
    }

    #[test]
    fn cuboid_weights_integrate_to_volume() {
        for half_edges in [[0.5, 0.5, 0.5], [0.5, 0.5, 1.5], [0.3, 0.7, 1.2]] {
            let vol = 8.0 * half_edges[0] * half_edges[1] * half_edges[2];
            let rule = SphereRule::cubed_sphere(20);
            let integral = 4.0 * PI * rule.mean(|n| cuboid_shape_weight(n, &half_edges));
            approx_eq(integral / vol, 1.0, 1e-3);
        }
        // the weight is even and invariant under permutations of the box
        let n = [0.48, 0.6, 0.64];
        approx_eq(
            cuboid_shape_weight(&n, &[1.0, 2.0, 3.0]),
            cuboid_shape_weight(&[-0.48, 0.6, -0.64], &[1.0, 2.0, 3.0]),
            1e-15,
        );
        approx_eq(
            cuboid_shape_weight(&n, &[1.0, 2.0, 3.0]),
            cuboid_shape_weight(&[0.6, 0.48, 0.64], &[2.0, 1.0, 3.0]),
            1e-15,
        );
    }

    #[test]
    fn dilatational_misfit_is_shape_independent() {
        // with isotropic elasticity, the energy of a purely dilatational misfit does not depend on the shape
        let ela = isotropic();
        let eps = [[0.01, 0.0, 0.0], [0.0, 0.01, 0.0], [0.0, 0.0, 0.01]];
        let params = QuadratureParams::new();
        let sphere = khachaturyan_energy(&ela, &eps, &Inclusion::sphere(1.0), &params).unwrap();
        let needle = Inclusion::Ellipsoid {
            semi_axes: [0.5, 0.5, 4.0],
        };
        let cube = Inclusion::Cuboid {
            half_edges: [0.5, 0.5, 0.5],
        };
        let vol = 4.0 * PI / 3.0;
        let e_needle = khachaturyan_energy(&ela, &eps, &needle, &params).unwrap();
        let e_cube = khachaturyan_energy(&ela, &eps, &cube, &params).unwrap();
        approx_eq(e_needle / needle.volume(), sphere / vol, 1e-9 * sphere);
        approx_eq((e_cube / cube.volume()) / (sphere / vol), 1.0, 1e-3);
    }

    #[test]
    fn exact_sphere_average_matches_quadrature() {
        let (lambda, mu) = isotropic().isotropic_lame().unwrap();
        // same stiffness, slightly perturbed so that the exact average is skipped
        let ela = ElasticConstants::from_cubic(lambda + 2.0 * mu, lambda, mu * (1.0 + 1e-8)).unwrap();
        let eps = [[6.67e-3, 1e-3, 0.0], [1e-3, 6.67e-3, 0.0], [0.0, 0.0, 2.86e-2]];
        let params = QuadratureParams::new();
        let exact = khachaturyan_energy(&isotropic(), &eps, &Inclusion::sphere(1e-9), &params).unwrap();
        let quad = khachaturyan_energy(&ela, &eps, &Inclusion::sphere(1e-9), &params).unwrap();
        approx_eq(quad / exact, 1.0, 1e-6);
    }

    #[test]
    fn energy_scales_with_volume() {
        let ela = ElasticConstants::from_cubic(168.4e9, 121.4e9, 75.4e9).unwrap();
        let eps = [[0.022, 0.0, 0.0], [0.0, 0.022, 0.0], [0.0, 0.0, 0.003]];
        let params = QuadratureParams::new();
        let small = Inclusion::Cuboid {
            half_edges: [1e-9, 1e-9, 2e-9],
        };
        let large = Inclusion::Cuboid {
            half_edges: [2e-9, 2e-9, 4e-9],
        };
        let e_small = khachaturyan_energy(&ela, &eps, &small, &params).unwrap();
        let e_large = khachaturyan_energy(&ela, &eps, &large, &params).unwrap();
        assert!(e_small > 0.0);
        approx_eq(e_large / e_small, 8.0, 1e-12);
    }

    #[test]
    fn khachaturyan_energy_captures_errors() {
        let ela = isotropic();
        let eps = [[0.01, 0.0, 0.0], [0.0, 0.01, 0.0], [0.0, 0.0, 0.01]];
        let params = QuadratureParams::new();
        let bad = Inclusion::Cuboid {
            half_edges: [1.0, 0.0, 1.0],
        };
        assert!(matches!(
            khachaturyan_energy(&ela, &eps, &bad, &params),
            Err(Error::InvalidInput(_))
        ));
    }
}
