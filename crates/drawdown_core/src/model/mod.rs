mod allocation;
mod asset;
mod correlation;
mod ids;
mod results;
mod scenario;

pub use allocation::{Holdings, PortfolioAllocation, WEIGHT_TOLERANCE};
pub use asset::{
    AssetStats, AssetUniverse, MAX_ANNUAL_MEAN_RETURN, MAX_ANNUAL_VOLATILITY, PriceStatistics,
    TRADING_DAYS_PER_YEAR,
};
pub use correlation::{CorrelationMatrix, cholesky};
pub use ids::AssetId;
pub use results::{MonteCarloProgress, MonteCarloResult, TrialResult, TrialStatus};
pub use scenario::EconomicScenario;
