//! Monthly log return generation

use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::ConfigError;
use crate::model::{AssetId, AssetUniverse, cholesky};

/// Normal monthly log return generator for a fixed list of assets.
///
/// Each month a vector of standard normal shocks `z` is drawn and asset `i`
/// receives `mean_i + vol_i * (L z)_i`, where `L` is the Cholesky factor of
/// the correlation matrix (identity when draws are independent).
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnModel {
    means: Vec<f64>,
    volatilities: Vec<f64>,
    factor: Option<Vec<Vec<f64>>>,
}

impl ReturnModel {
    /// Build a model for `assets` (in that order) from annual statistics
    pub fn from_universe(universe: &AssetUniverse, assets: &[AssetId]) -> Result<Self, ConfigError> {
        let mut means = Vec::with_capacity(assets.len());
        let mut volatilities = Vec::with_capacity(assets.len());
        for asset in assets {
            let stats = universe
                .get(asset)
                .ok_or_else(|| ConfigError::UnknownAsset {
                    portfolio: String::new(),
                    asset: asset.clone(),
                })?;
            stats.validate(asset)?;
            means.push(stats.monthly_mean());
            volatilities.push(stats.monthly_volatility());
        }

        let factor = match universe.correlation() {
            Some(correlation) => {
                let sub = correlation.submatrix(assets);
                let is_identity = sub.iter().enumerate().all(|(i, row)| {
                    row.iter()
                        .enumerate()
                        .all(|(j, v)| if i == j { *v == 1.0 } else { *v == 0.0 })
                });
                if is_identity {
                    None
                } else {
                    Some(cholesky(&sub)?)
                }
            }
            None => None,
        };

        Ok(Self {
            means,
            volatilities,
            factor,
        })
    }

    #[must_use]
    pub fn num_assets(&self) -> usize {
        self.means.len()
    }

    #[must_use]
    pub fn is_correlated(&self) -> bool {
        self.factor.is_some()
    }

    /// Fill `out` with one month of log returns.
    ///
    /// `shocks` is scratch space of the same length.
    pub fn sample_month<R: Rng + ?Sized>(&self, rng: &mut R, shocks: &mut [f64], out: &mut [f64]) {
        for z in shocks.iter_mut() {
            *z = rng.sample(StandardNormal);
        }

        match &self.factor {
            Some(l) => {
                for (i, r) in out.iter_mut().enumerate() {
                    let correlated: f64 = l[i][..=i]
                        .iter()
                        .zip(shocks.iter())
                        .map(|(lij, z)| lij * z)
                        .sum();
                    *r = self.means[i] + self.volatilities[i] * correlated;
                }
            }
            None => {
                for (i, r) in out.iter_mut().enumerate() {
                    *r = self.means[i] + self.volatilities[i] * shocks[i];
                }
            }
        }
    }
}
