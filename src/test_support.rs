use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use crate::collocation::types::{
    CollocationBatch, CollocationBatchResult, CollocationBatchStatus, CriterionResult,
};
use crate::collocation::CollocationBatchRequest;

/// Opt-in log output while debugging tests: RUST_LOG=debug cargo test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn start_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
}

pub fn end_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap()
}

pub fn test_request() -> CollocationBatchRequest {
    CollocationBatchRequest {
        batch_name: "soroti parish".to_string(),
        devices: vec!["aq-01".to_string(), "aq-02".to_string()],
        base_device: "ref-01".to_string(),
        start_date: start_date(),
        end_date: end_date(),
        expected_hourly_records: json!(24),
        data_completeness_threshold: json!(0.9),
        intra_correlation_threshold: json!(0.98),
        inter_correlation_threshold: json!(0.98),
        intra_correlation_r2_threshold: json!(0.95),
        inter_correlation_r2_threshold: json!(0.95),
        differences_threshold: json!(5),
        data_completeness_parameter: "timestamp".to_string(),
        inter_correlation_parameter: "pm2_5".to_string(),
        intra_correlation_parameter: "pm2_5".to_string(),
        differences_parameter: "pm2_5".to_string(),
        inter_correlation_additional_parameters: vec!["pm10".to_string()],
        created_by: json!({"first_name": "Ada", "last_name": "Obi"}),
    }
}

pub fn test_batch(devices: &[&str]) -> CollocationBatch {
    CollocationBatch {
        batch_id: "batch-0001".to_string(),
        batch_name: "soroti parish".to_string(),
        devices: to_names(devices),
        base_device: "ref-01".to_string(),
        start_date: start_date(),
        end_date: end_date(),
        date_created: start_date() - chrono::Duration::days(1),
        expected_hourly_records: 24,
        inter_correlation_threshold: 0.98,
        intra_correlation_threshold: 0.98,
        inter_correlation_r2_threshold: 0.95,
        intra_correlation_r2_threshold: 0.95,
        data_completeness_threshold: 0.9,
        differences_threshold: 5,
        data_completeness_parameter: "timestamp".to_string(),
        inter_correlation_parameter: "pm2_5".to_string(),
        intra_correlation_parameter: "pm2_5".to_string(),
        differences_parameter: "pm2_5".to_string(),
        inter_correlation_additional_parameters: vec!["pm10".to_string()],
        created_by: json!({"first_name": "Ada", "last_name": "Obi"}),
        status: CollocationBatchStatus::Scheduled,
        results: CollocationBatchResult::empty(),
        errors: Vec::new(),
    }
}

/// One criterion outcome with the given device-name sets and no detail rows.
pub fn outcome<T>(passed: &[&str], failed: &[&str], error: &[&str]) -> CriterionResult<T> {
    CriterionResult {
        results: Vec::new(),
        passed_devices: to_names(passed),
        failed_devices: to_names(failed),
        error_devices: to_names(error),
        errors: Vec::new(),
    }
}

/// A batch result with the same device-name sets across all four criteria.
pub fn uniform_results(passed: &[&str], failed: &[&str], error: &[&str]) -> CollocationBatchResult {
    CollocationBatchResult {
        data_completeness: outcome(passed, failed, error),
        statistics: Vec::new(),
        differences: outcome(passed, failed, error),
        intra_sensor_correlation: outcome(passed, failed, error),
        inter_sensor_correlation: outcome(passed, failed, error),
        data_source: "raw_data".to_string(),
        errors: Vec::new(),
    }
}

fn to_names(devices: &[&str]) -> Vec<String> {
    devices.iter().map(|device| device.to_string()).collect()
}
