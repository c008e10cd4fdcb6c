use thiserror::Error;

use crate::model::AssetId;

/// Errors raised while validating a run description.
///
/// Every variant is produced before any trial runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("portfolio '{portfolio}' has an empty allocation")]
    EmptyAllocation { portfolio: String },

    #[error("portfolio '{portfolio}' has negative weight {weight} for asset '{asset}'")]
    NegativeWeight {
        portfolio: String,
        asset: AssetId,
        weight: f64,
    },

    #[error("portfolio '{portfolio}' has a non-finite weight for asset '{asset}'")]
    NonFiniteWeight { portfolio: String, asset: AssetId },

    #[error("portfolio '{portfolio}' weights sum to {sum}, expected 1.0")]
    WeightsDoNotSumToOne { portfolio: String, sum: f64 },

    #[error("portfolio '{portfolio}' references unknown asset '{asset}'")]
    UnknownAsset { portfolio: String, asset: AssetId },

    #[error(
        "asset '{asset}' has invalid statistics (mean={mean}, volatility={volatility}): {reason}"
    )]
    InvalidAssetStats {
        asset: AssetId,
        mean: f64,
        volatility: f64,
        reason: &'static str,
    },

    #[error("{field} must be {constraint}, got {value}")]
    InvalidParameter {
        field: &'static str,
        constraint: &'static str,
        value: f64,
    },

    #[error("invalid bonus schedule: {0}")]
    InvalidBonusSchedule(String),

    #[error("invalid correlation matrix: {0}")]
    InvalidCorrelation(String),

    #[error("scenario '{scenario}': {reason}")]
    InvalidScenario { scenario: String, reason: String },

    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },

    #[error("a study needs at least one {0}")]
    MissingComponent(&'static str),
}

impl ConfigError {
    pub(crate) fn parameter(field: &'static str, constraint: &'static str, value: f64) -> Self {
        ConfigError::InvalidParameter {
            field,
            constraint,
            value,
        }
    }
}

/// Errors from running a batch of trials
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The caller raised the cancel flag before all trials finished
    #[error("simulation cancelled")]
    Cancelled,
}

/// Errors from deriving asset statistics out of a price series
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("need at least two prices to compute returns, got {count}")]
    TooFewObservations { count: usize },

    #[error("price at index {index} must be positive and finite, got {price}")]
    InvalidPrice { index: usize, price: f64 },

    #[error("periods per year must be positive and finite, got {0}")]
    InvalidPeriodsPerYear(f64),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
