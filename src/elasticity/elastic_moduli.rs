use crate::base::{Error, Result, MODULI_TOLERANCE};
use serde::{Deserialize, Serialize};

/// Holds a (possibly redundant) set of isotropic elastic moduli
///
/// At least two moduli must be given. Any extra modulus must agree with the values implied
/// by the first two (taken in the order young, poisson, shear, bulk, lame).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElasticModuli {
    /// Young's modulus E
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub young: Option<f64>,

    /// Poisson's coefficient ν
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poisson: Option<f64>,

    /// Shear modulus G (Lamé's μ)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shear: Option<f64>,

    /// Bulk modulus K
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bulk: Option<f64>,

    /// Lamé's first parameter λ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lame: Option<f64>,
}

/// Identifies a modulus
#[derive(Clone, Copy, Debug, PartialEq)]
enum Modulus {
    Young,
    Poisson,
    Shear,
    Bulk,
    Lame,
}

impl ElasticModuli {
    /// Allocates an empty set of moduli
    pub fn new() -> Self {
        ElasticModuli::default()
    }

    /// Returns the moduli defined by Young's modulus and Poisson's coefficient
    pub fn young_poisson(young: f64, poisson: f64) -> Self {
        ElasticModuli {
            young: Some(young),
            poisson: Some(poisson),
            ..Default::default()
        }
    }

    /// Returns the moduli defined by the shear modulus and Poisson's coefficient
    pub fn shear_poisson(shear: f64, poisson: f64) -> Self {
        ElasticModuli {
            shear: Some(shear),
            poisson: Some(poisson),
            ..Default::default()
        }
    }

    /// Returns the moduli defined by the shear and bulk moduli
    pub fn shear_bulk(shear: f64, bulk: f64) -> Self {
        ElasticModuli {
            shear: Some(shear),
            bulk: Some(bulk),
            ..Default::default()
        }
    }

    /// Returns the given values in canonical order
    fn given(&self) -> Vec<(Modulus, f64)> {
        [
            (Modulus::Young, self.young),
            (Modulus::Poisson, self.poisson),
            (Modulus::Shear, self.shear),
            (Modulus::Bulk, self.bulk),
            (Modulus::Lame, self.lame),
        ]
        .iter()
        .filter_map(|(m, v)| v.map(|x| (*m, x)))
        .collect()
    }

    /// Calculates the Lamé parameters (λ, μ)
    ///
    /// # Errors
    ///
    /// * [Error::Configuration] if fewer than two moduli are given, if any value is not finite,
    ///   if the pair is degenerate, or if redundant values are inconsistent
    pub fn lame_parameters(&self) -> Result<(f64, f64)> {
        let given = self.given();
        if given.len() < 2 {
            return Err(Error::Configuration(
                "at least two elastic moduli must be given".to_string(),
            ));
        }
        if let Some((m, v)) = given.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::Configuration(format!("{:?} modulus must be finite (got {})", m, v)));
        }
        let (lambda, mu) = lame_from_pair(given[0], given[1])?;
        if !lambda.is_finite() || !mu.is_finite() {
            return Err(Error::Configuration(format!(
                "moduli {:?} and {:?} do not define finite Lamé parameters",
                given[0].0, given[1].0
            )));
        }
        for (m, value) in &given[2..] {
            let implied = implied_modulus(*m, lambda, mu);
            let ok = match m {
                Modulus::Poisson => f64::abs(value - implied) <= MODULI_TOLERANCE,
                _ => f64::abs(value - implied) <= MODULI_TOLERANCE * f64::max(f64::abs(implied), f64::abs(*value)),
            };
            if !ok {
                return Err(Error::Configuration(format!(
                    "{:?} modulus {} is inconsistent with the value {} implied by {:?} and {:?}",
                    m, value, implied, given[0].0, given[1].0
                )));
            }
        }
        Ok((lambda, mu))
    }

    /// Returns the complete set of moduli (E, ν, G, K, λ) implied by this specification
    pub fn complete(&self) -> Result<ElasticModuli> {
        let (lambda, mu) = self.lame_parameters()?;
        Ok(ElasticModuli {
            young: Some(implied_modulus(Modulus::Young, lambda, mu)),
            poisson: Some(implied_modulus(Modulus::Poisson, lambda, mu)),
            shear: Some(mu),
            bulk: Some(implied_modulus(Modulus::Bulk, lambda, mu)),
            lame: Some(lambda),
        })
    }
}

/// Computes a modulus from the Lamé parameters
fn implied_modulus(which: Modulus, lambda: f64, mu: f64) -> f64 {
    match which {
        Modulus::Young => mu * (3.0 * lambda + 2.0 * mu) / (lambda + mu),
        Modulus::Poisson => lambda / (2.0 * (lambda + mu)),
        Modulus::Shear => mu,
        Modulus::Bulk => lambda + 2.0 * mu / 3.0,
        Modulus::Lame => lambda,
    }
}

/// Computes (λ, μ) from two moduli given in canonical order
fn lame_from_pair(first: (Modulus, f64), second: (Modulus, f64)) -> Result<(f64, f64)> {
    let degenerate = || {
        Err(Error::Configuration(format!(
            "moduli {:?} = {} and {:?} = {} do not determine an isotropic material",
            first.0, first.1, second.0, second.1
        )))
    };
    let res = match (first, second) {
        ((Modulus::Young, ee), (Modulus::Poisson, nu)) => {
            (ee * nu / ((1.0 + nu) * (1.0 - 2.0 * nu)), ee / (2.0 * (1.0 + nu)))
        }
        ((Modulus::Young, ee), (Modulus::Shear, gg)) => (gg * (ee - 2.0 * gg) / (3.0 * gg - ee), gg),
        ((Modulus::Young, ee), (Modulus::Bulk, kk)) => (
            3.0 * kk * (3.0 * kk - ee) / (9.0 * kk - ee),
            3.0 * kk * ee / (9.0 * kk - ee),
        ),
        ((Modulus::Young, ee), (Modulus::Lame, lambda)) => {
            let r = f64::sqrt(ee * ee + 9.0 * lambda * lambda + 2.0 * ee * lambda);
            (lambda, (ee - 3.0 * lambda + r) / 4.0)
        }
        ((Modulus::Poisson, nu), (Modulus::Shear, gg)) => (2.0 * gg * nu / (1.0 - 2.0 * nu), gg),
        ((Modulus::Poisson, nu), (Modulus::Bulk, kk)) => (
            3.0 * kk * nu / (1.0 + nu),
            3.0 * kk * (1.0 - 2.0 * nu) / (2.0 * (1.0 + nu)),
        ),
        ((Modulus::Poisson, nu), (Modulus::Lame, lambda)) => {
            if nu == 0.0 {
                return degenerate();
            }
            (lambda, lambda * (1.0 - 2.0 * nu) / (2.0 * nu))
        }
        ((Modulus::Shear, gg), (Modulus::Bulk, kk)) => (kk - 2.0 * gg / 3.0, gg),
        ((Modulus::Shear, gg), (Modulus::Lame, lambda)) => (lambda, gg),
        ((Modulus::Bulk, kk), (Modulus::Lame, lambda)) => (lambda, 1.5 * (kk - lambda)),
        _ => return degenerate(),
    };
    Ok(res)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
