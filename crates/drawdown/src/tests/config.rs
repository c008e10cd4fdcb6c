use drawdown_core::cash_flow::BonusSchedule;
use drawdown_core::model::AssetId;
use drawdown_core::rebalance::RebalanceStrategy;

use super::{MINIMAL_SETTINGS, SAMPLE_SETTINGS};
use crate::config::{AssetConfig, Frequency, RebalanceConfig, RunConfig};

#[test]
fn test_sample_settings_parse_and_validate() {
    let config = RunConfig::from_yaml(SAMPLE_SETTINGS).unwrap();
    let study = config.to_study().unwrap();

    assert_eq!(study.config.initial_capital, 100_000.0);
    assert_eq!(study.config.horizon_months, 120);
    assert_eq!(study.config.num_trials, 10_000);
    assert_eq!(study.config.start_date, Some(jiff::civil::date(2025, 1, 1)));
    assert!(study.config.cash_flows.inflation_indexed);
    assert_eq!(study.portfolios.len(), 3);
    assert_eq!(study.scenarios.len(), 3);
    assert!(study.universe.correlation().is_some());

    let bonus = study.config.cash_flows.bonus.as_ref().unwrap();
    assert_eq!(bonus.amount, 1_200.0);
    assert_eq!(bonus.schedule, BonusSchedule::semiannual());

    let pessimistic = study
        .scenarios
        .iter()
        .find(|s| s.name == "pessimistic")
        .unwrap();
    assert_eq!(pessimistic.volatility_scale, 1.25);
    assert_eq!(pessimistic.return_shift, -0.02);
}

#[test]
fn test_portfolio_names_and_rebalance_rules() {
    let config = RunConfig::from_yaml(SAMPLE_SETTINGS).unwrap();
    let portfolios = config.portfolios().unwrap();

    // map keys sort as classic, equity, permanent
    let names: Vec<&str> = portfolios.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["60/40", "all-equity", "permanent"]);
    assert_eq!(portfolios[0].rebalance(), RebalanceStrategy::ANNUAL);
    assert_eq!(portfolios[1].rebalance(), RebalanceStrategy::Never);
    assert_eq!(
        portfolios[2].rebalance(),
        RebalanceStrategy::Threshold { threshold: 0.05 }
    );
    assert_eq!(portfolios[2].weight(&AssetId::cash()), Some(0.25));
}

#[test]
fn test_rebalance_config_strategy() {
    let time = |frequency, months| RebalanceConfig::Time { frequency, months };
    assert_eq!(
        time(Some(Frequency::Quarterly), None).strategy(),
        RebalanceStrategy::QUARTERLY
    );
    assert_eq!(
        time(Some(Frequency::Semiannual), None).strategy(),
        RebalanceStrategy::Periodic { months: 6 }
    );
    assert_eq!(
        time(Some(Frequency::Annual), Some(2)).strategy(),
        RebalanceStrategy::Periodic { months: 2 }
    );
    assert_eq!(time(None, None).strategy(), RebalanceStrategy::ANNUAL);
    assert_eq!(RebalanceConfig::default().strategy(), RebalanceStrategy::ANNUAL);
}

#[test]
fn test_minimal_settings_defaults() {
    let config = RunConfig::from_yaml(MINIMAL_SETTINGS).unwrap();
    let study = config.to_study().unwrap();

    assert_eq!(study.config.seed, 7);
    assert_eq!(study.config.cash_flows.bonus, None);
    assert_eq!(study.config.cash_flows.monthly_contribution, 0.0);
    assert!(!study.config.cash_flows.inflation_indexed);
    assert_eq!(config.project.output_dir, std::path::PathBuf::from("results"));
    assert_eq!(
        study.portfolios[0].rebalance(),
        RebalanceStrategy::QUARTERLY
    );
}

#[test]
fn test_disabled_contributions_are_ignored() {
    let yaml = MINIMAL_SETTINGS.replace(
        "simulation:",
        "contributions:\n  enabled: false\n  periodic_contribution: 500\n\nsimulation:",
    );
    let config = RunConfig::from_yaml(&yaml).unwrap();
    assert_eq!(
        config.simulation_config().unwrap().cash_flows.monthly_contribution,
        0.0
    );

    let enabled = yaml.replace("enabled: false", "enabled: true");
    let config = RunConfig::from_yaml(&enabled).unwrap();
    assert_eq!(
        config.simulation_config().unwrap().cash_flows.monthly_contribution,
        500.0
    );
}

#[test]
fn test_invalid_weights_rejected() {
    let yaml = MINIMAL_SETTINGS.replace("flat: 1.0", "flat: 0.9");
    let config = RunConfig::from_yaml(&yaml).unwrap();
    let err = config.to_study().unwrap_err();
    assert!(format!("{err:?}").contains("flat"));
}

#[test]
fn test_unknown_asset_rejected() {
    let yaml = MINIMAL_SETTINGS.replace("      flat: 1.0", "      flat: 0.5\n      gold: 0.5");
    let config = RunConfig::from_yaml(&yaml).unwrap();
    assert!(config.to_study().is_err());
}

#[test]
fn test_missing_horizon_rejected() {
    let yaml = MINIMAL_SETTINGS.replace("  horizon_months: 120\n", "");
    let config = RunConfig::from_yaml(&yaml).unwrap();
    assert!(config.simulation_config().is_err());
}

#[test]
fn test_oversized_horizon_rejected() {
    let years = MINIMAL_SETTINGS.replace(
        "  horizon_months: 120\n",
        "  simulation_horizon_years: 4611686018427387904\n",
    );
    let config = RunConfig::from_yaml(&years).unwrap();
    assert!(config.simulation_config().is_err());

    let months = MINIMAL_SETTINGS.replace("horizon_months: 120", "horizon_months: 5000");
    let config = RunConfig::from_yaml(&months).unwrap();
    assert!(config.to_study().is_err());
}

#[test]
fn test_asset_from_prices() {
    let asset = AssetConfig {
        prices: vec![100.0, 101.0, 100.5, 102.0, 103.0],
        periods_per_year: Some(12.0),
        ..Default::default()
    };
    let stats = asset.stats().unwrap();
    assert!(stats.mean_return > 0.0);
    assert!(stats.volatility > 0.0);

    let both = AssetConfig {
        mean_return: Some(0.05),
        volatility: Some(0.1),
        prices: vec![1.0, 2.0],
        periods_per_year: None,
    };
    assert!(both.stats().is_err());

    let partial = AssetConfig {
        mean_return: Some(0.05),
        ..Default::default()
    };
    assert!(partial.stats().is_err());
}
