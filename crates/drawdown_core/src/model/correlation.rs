//! Correlation structure between asset return shocks

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::ids::AssetId;
use crate::error::ConfigError;

const SYMMETRY_TOLERANCE: f64 = 1e-9;
/// Pivots above `-PSD_TOLERANCE` are treated as zero rather than rejected
const PSD_TOLERANCE: f64 = 1e-10;

/// Correlation matrix over a list of assets.
///
/// Assets absent from the list are uncorrelated with everything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    assets: Vec<AssetId>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn new(assets: Vec<AssetId>, values: Vec<Vec<f64>>) -> Result<Self, ConfigError> {
        let matrix = Self { assets, values };
        matrix.validate()?;
        Ok(matrix)
    }

    #[must_use]
    pub fn assets(&self) -> &[AssetId] {
        &self.assets
    }

    #[must_use]
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = self.assets.len();
        if self.values.len() != n || self.values.iter().any(|row| row.len() != n) {
            return Err(ConfigError::InvalidCorrelation(format!(
                "expected a {n}x{n} matrix for {n} assets"
            )));
        }

        let mut seen = FxHashMap::default();
        for (i, asset) in self.assets.iter().enumerate() {
            if seen.insert(asset, i).is_some() {
                return Err(ConfigError::InvalidCorrelation(format!(
                    "asset '{asset}' listed twice"
                )));
            }
        }

        for i in 0..n {
            if (self.values[i][i] - 1.0).abs() > SYMMETRY_TOLERANCE {
                return Err(ConfigError::InvalidCorrelation(format!(
                    "diagonal entry for '{}' must be 1.0, got {}",
                    self.assets[i], self.values[i][i]
                )));
            }
            for j in 0..n {
                let v = self.values[i][j];
                if !v.is_finite() || !(-1.0..=1.0).contains(&v) {
                    return Err(ConfigError::InvalidCorrelation(format!(
                        "entry ({i}, {j}) must lie in [-1, 1], got {v}"
                    )));
                }
                if (v - self.values[j][i]).abs() > SYMMETRY_TOLERANCE {
                    return Err(ConfigError::InvalidCorrelation(format!(
                        "matrix is not symmetric at ({i}, {j})"
                    )));
                }
            }
        }

        cholesky(&self.values).map(|_| ())
    }

    /// Correlation matrix restricted to (and reordered by) `order`
    #[must_use]
    pub fn submatrix(&self, order: &[AssetId]) -> Vec<Vec<f64>> {
        let index: FxHashMap<&AssetId, usize> = self
            .assets
            .iter()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();

        order
            .iter()
            .map(|a| {
                order
                    .iter()
                    .map(|b| {
                        if a == b {
                            return 1.0;
                        }
                        match (index.get(a), index.get(b)) {
                            (Some(&i), Some(&j)) => self.values[i][j],
                            _ => 0.0,
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

/// Cholesky factorisation of a symmetric positive semi-definite matrix.
///
/// Returns the lower-triangular `L` with `A = L * L^T`. Zero pivots (perfectly
/// correlated assets) are allowed; negative pivots are rejected.
pub fn cholesky(matrix: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ConfigError> {
    let n = matrix.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();

            if i == j {
                let diag = matrix[i][i] - sum;
                if diag < -PSD_TOLERANCE {
                    return Err(ConfigError::InvalidCorrelation(
                        "matrix is not positive semi-definite".to_string(),
                    ));
                }
                l[i][j] = diag.max(0.0).sqrt();
            } else if l[j][j] > 0.0 {
                l[i][j] = (matrix[i][j] - sum) / l[j][j];
            } else {
                l[i][j] = 0.0;
            }
        }
    }

    Ok(l)
}
