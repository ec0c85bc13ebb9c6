//! Bootstrap configuration flowing into the engine
//!
//! Tests that set CTOWER_CONFIG are #[serial] so they do not race on the
//! process environment.

use std::env;
use std::sync::Arc;

use ctower_baseline::models::{BaselineRequest, MetricName};
use ctower_baseline::services::ProvidedSource;
use ctower_baseline::RangeTable;
use ctower_common::config::{
    load_config, resolve_config_source, write_toml_config, CalculationMode, RangeTableConfig,
    TomlConfig, CONFIG_ENV_VAR,
};
use ctower_common::Error;
use serial_test::serial;
use tempfile::TempDir;

/// Standard table as raw config with one escalation bucket replaced
fn table_with_complex_tasks(min: f64, max: f64) -> RangeTableConfig {
    let json = serde_json::to_value(RangeTable::standard()).unwrap();
    let mut config: RangeTableConfig = serde_json::from_value(json).unwrap();
    if let Some(buckets) = config
        .get_mut("solution_level_kpis")
        .and_then(|metrics| metrics.get_mut("task_escalation_rate"))
    {
        buckets.insert("complex_tasks".to_string(), [min, max]);
    }
    config
}

#[tokio::test]
#[serial]
async fn test_config_file_from_environment_drives_engine() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("ctower").join("config.toml");

    let mut config = TomlConfig::default();
    config.engine.mode = CalculationMode::Extended;
    config.engine.event_capacity = 16;
    config.range_table = Some(table_with_complex_tasks(12.0, 22.0));
    write_toml_config(&config, &path).unwrap();

    env::set_var(CONFIG_ENV_VAR, &path);
    let loaded = load_config(&resolve_config_source(None, CONFIG_ENV_VAR));
    env::remove_var(CONFIG_ENV_VAR);
    let loaded = loaded.unwrap();
    assert_eq!(loaded, config);

    let registry = ctower_baseline::build_registry(&loaded, Arc::new(ProvidedSource)).unwrap();
    assert_eq!(registry.engine().mode(), CalculationMode::Extended);

    let report = registry
        .run_blocking(BaselineRequest::new("support agent"))
        .await
        .unwrap();
    let baselines = &report.baseline_calculations.calculated_baselines;
    assert_eq!(baselines.len(), 8);
    assert!(baselines.contains(MetricName::GuardrailViolations));

    let escalation = baselines.get(MetricName::TaskEscalationRate).unwrap();
    assert_eq!(
        (escalation.min, escalation.max, escalation.recommended),
        (12.0, 22.0, 17.0)
    );
    assert_eq!(
        report.comparison_results.insights.unwrap().recommendations.len(),
        4
    );
}

#[test]
fn test_inverted_range_is_rejected_at_startup() {
    let mut config = TomlConfig::default();
    config.range_table = Some(table_with_complex_tasks(30.0, 10.0));

    let result = ctower_baseline::build_registry(&config, Arc::new(ProvidedSource));
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_zero_event_capacity_is_config_error() {
    let mut config = TomlConfig::default();
    config.engine.event_capacity = 0;

    let result = ctower_baseline::build_registry(&config, Arc::new(ProvidedSource));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[tokio::test]
async fn test_defaults_without_config_file() {
    let config = TomlConfig::default();
    let registry = ctower_baseline::build_registry(&config, Arc::new(ProvidedSource)).unwrap();

    assert_eq!(registry.engine().mode(), CalculationMode::Standard);
    assert_eq!(registry.engine().range_table(), &RangeTable::standard());

    let report = registry
        .run_blocking(BaselineRequest::new("support agent"))
        .await
        .unwrap();
    assert_eq!(report.summary.total_metrics_analyzed, 7);
    assert_eq!(
        report.comparison_results.insights.unwrap().recommendations.len(),
        2
    );
}
