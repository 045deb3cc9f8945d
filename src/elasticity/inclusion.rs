use crate::base::{ellipsoid_volume, Error, Result, FOUR_PI_BY_3};
use crate::shape::Morphology;
use serde::{Deserialize, Serialize};

/// Defines the geometry of an inclusion
///
/// The axes of the inclusion are aligned with the coordinate axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Inclusion {
    /// Ellipsoid with semi-axes (a₁, a₂, a₃)
    Ellipsoid { semi_axes: [f64; 3] },

    /// Rectangular box with half-edges (l₁, l₂, l₃)
    Cuboid { half_edges: [f64; 3] },
}

impl Inclusion {
    /// Allocates a spherical inclusion
    pub fn sphere(radius: f64) -> Self {
        Inclusion::Ellipsoid {
            semi_axes: [radius, radius, radius],
        }
    }

    /// Allocates the inclusion of a precipitate with given equivalent spherical radius, morphology and aspect ratio
    ///
    /// With r being the short-axis radius:
    ///
    /// * sphere: semi-axes (R_sph, R_sph, R_sph); the aspect ratio is ignored
    /// * needle: semi-axes (r, r, αr)
    /// * plate: semi-axes (αr, αr, r)
    /// * cuboidal: half-edges (r/2, r/2, αr/2), i.e., volume α r³
    pub fn for_shape(equivalent_radius: f64, morphology: Morphology, aspect_ratio: f64) -> Result<Self> {
        let alpha = match morphology {
            Morphology::Sphere => 1.0,
            _ => aspect_ratio,
        };
        let r = morphology.short_radius(equivalent_radius, alpha)?;
        let res = match morphology {
            Morphology::Sphere => Inclusion::sphere(equivalent_radius),
            Morphology::Needle => Inclusion::Ellipsoid {
                semi_axes: [r, r, alpha * r],
            },
            Morphology::Plate => Inclusion::Ellipsoid {
                semi_axes: [alpha * r, alpha * r, r],
            },
            Morphology::Cuboidal => Inclusion::Cuboid {
                half_edges: [0.5 * r, 0.5 * r, 0.5 * alpha * r],
            },
        };
        Ok(res)
    }

    /// Returns the semi-axes or half-edges
    pub fn dimensions(&self) -> &[f64; 3] {
        match self {
            Inclusion::Ellipsoid { semi_axes } => semi_axes,
            Inclusion::Cuboid { half_edges } => half_edges,
        }
    }

    /// Checks that all dimensions are finite and positive
    pub fn validate(&self) -> Result<()> {
        let dims = self.dimensions();
        if dims.iter().any(|a| !a.is_finite() || *a <= 0.0) {
            return Err(Error::InvalidInput(format!(
                "inclusion dimensions must be finite and > 0 (got {:?})",
                dims
            )));
        }
        Ok(())
    }

    /// Returns the volume
    pub fn volume(&self) -> f64 {
        match self {
            Inclusion::Ellipsoid { semi_axes } => ellipsoid_volume(semi_axes),
            Inclusion::Cuboid { half_edges } => 8.0 * half_edges[0] * half_edges[1] * half_edges[2],
        }
    }

    /// Returns the semi-axes of the ellipsoid with the same volume and the same axis ratios
    pub fn equivalent_ellipsoid(&self) -> [f64; 3] {
        match self {
            Inclusion::Ellipsoid { semi_axes } => *semi_axes,
            Inclusion::Cuboid { half_edges } => {
                let scale = f64::cbrt(8.0 / FOUR_PI_BY_3);
                [scale * half_edges[0], scale * half_edges[1], scale * half_edges[2]]
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Inclusion;
    use crate::base::{ellipsoid_volume, sphere_volume, Error};
    use crate::shape::Morphology;
    use russell_lab::approx_eq;

    #[test]
    fn for_shape_works() {
        let rr = 4e-9;
        let vol = sphere_volume(rr);
        for m in [Morphology::Sphere, Morphology::Needle, Morphology::Plate, Morphology::Cuboidal] {
            for alpha in [1.0, 2.0, 7.5] {
                let inc = Inclusion::for_shape(rr, m, alpha).unwrap();
                approx_eq(inc.volume() / vol, 1.0, 1e-14);
            }
        }
        let inc = Inclusion::for_shape(2.0, Morphology::Needle, 8.0).unwrap();
        assert_eq!(inc, Inclusion::Ellipsoid { semi_axes: [1.0, 1.0, 8.0] });
        let inc = Inclusion::for_shape(4.0, Morphology::Plate, 8.0).unwrap();
        assert_eq!(inc, Inclusion::Ellipsoid { semi_axes: [8.0, 8.0, 1.0] });
        let inc = Inclusion::for_shape(3.0, Morphology::Sphere, 8.0).unwrap();
        assert_eq!(inc, Inclusion::sphere(3.0));
        if let Inclusion::Cuboid { half_edges } = Inclusion::for_shape(1.0, Morphology::Cuboidal, 3.0).unwrap() {
            approx_eq(half_edges[2] / half_edges[0], 3.0, 1e-15);
            assert_eq!(half_edges[0], half_edges[1]);
        } else {
            panic!("cuboid expected");
        }
    }

    #[test]
    fn equivalent_ellipsoid_works() {
        let inc = Inclusion::Cuboid {
            half_edges: [0.5, 0.5, 1.5],
        };
        let axes = inc.equivalent_ellipsoid();
        approx_eq(ellipsoid_volume(&axes), inc.volume(), 1e-14);
        approx_eq(axes[2] / axes[0], 3.0, 1e-15);
    }

    #[test]
    fn validate_works() {
        assert_eq!(Inclusion::sphere(1.0).validate(), Ok(()));
        let inc = Inclusion::Cuboid {
            half_edges: [1.0, -1.0, 1.0],
        };
        assert!(matches!(inc.validate(), Err(Error::InvalidInput(_))));
        assert!(matches!(
            Inclusion::for_shape(-1.0, Morphology::Needle, 2.0),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            Inclusion::for_shape(1.0, Morphology::Plate, 0.5),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn serde_works() {
        let inc = Inclusion::Cuboid {
            half_edges: [1.0, 2.0, 3.0],
        };
        let json = serde_json::to_string(&inc).unwrap();
        assert_eq!(json, "{\"cuboid\":{\"half_edges\":[1.0,2.0,3.0]}}");
        let back: Inclusion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inc);
    }
}
