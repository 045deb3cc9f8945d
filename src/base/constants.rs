use russell_lab::math::PI;

/// Defines √2, the Mandel factor applied to the shear components
pub const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// Defines 4π/3 (volume of the unit sphere)
pub const FOUR_PI_BY_3: f64 = 4.0 * PI / 3.0;

/// Defines the relative tolerance used to decide whether two semi-axes are equal
pub const AXES_TOLERANCE: f64 = 1e-12;

/// Defines the half-width of the band around α = 1 where the closed-form spheroid
/// Eshelby tensor is replaced by the quadrature (the closed form loses digits there)
pub const NEAR_SPHERE_BAND: f64 = 1e-2;

/// Defines the relative tolerance used to check consistency among redundant elastic moduli
pub const MODULI_TOLERANCE: f64 = 1e-6;

/// Holds the Voigt index pairs: 11, 22, 33, 23, 13, 12
pub const VOIGT_PAIRS: [(usize, usize); 6] = [(0, 0), (1, 1), (2, 2), (1, 2), (0, 2), (0, 1)];

/// Returns the Voigt (and Mandel) index of the pair (i, j)
#[inline]
pub fn voigt_index(i: usize, j: usize) -> usize {
    match (i, j) {
        (0, 0) => 0,
        (1, 1) => 1,
        (2, 2) => 2,
        (1, 2) | (2, 1) => 3,
        (0, 2) | (2, 0) => 4,
        _ => 5,
    }
}

/// Returns the Mandel weight of a Voigt index (1 for normal, √2 for shear components)
#[inline]
pub fn mandel_weight(index: usize) -> f64 {
    if index < 3 {
        1.0
    } else {
        SQRT_2
    }
}

/// Returns the volume of an ellipsoid with the given semi-axes
#[inline]
pub fn ellipsoid_volume(semi_axes: &[f64; 3]) -> f64 {
    FOUR_PI_BY_3 * semi_axes[0] * semi_axes[1] * semi_axes[2]
}

/// Returns the volume of the sphere with radius r
#[inline]
pub fn sphere_volume(r: f64) -> f64 {
    FOUR_PI_BY_3 * r * r * r
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
