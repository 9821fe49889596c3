use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollocationBatchStatus {
    Scheduled,
    Running,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollocationDeviceStatus {
    Error,
    Failed,
    Passed,
    Running,
    Scheduled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceStatusSummaryType {
    DataCompleteness,
    IntraSensorCorrelation,
    InterSensorCorrelation,
    Differences,
}

/// Per-device record-count outcome for the data completeness criterion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataCompleteness {
    pub device_name: String,
    pub expected: i64,
    pub actual: i64,
    pub completeness: f64,
    pub missing: f64,
    pub passed: bool,
}

/// Per-device sensor-to-sensor agreement for the intra correlation criterion.
/// Statistics are optional: upstream evaluation may be unable to compute them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntraSensorCorrelation {
    pub device_name: String,
    pub pm2_5_pearson: Option<f64>,
    pub pm10_pearson: Option<f64>,
    pub pm2_5_r2: Option<f64>,
    pub pm10_r2: Option<f64>,
    pub passed: bool,
}

/// One evaluation dimension's outcome: per-device detail rows plus the three
/// device-name sets the aggregation engine combines. `errors` carries
/// engine-level failures that are not tied to a single device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CriterionResult<T> {
    pub results: Vec<T>,
    pub passed_devices: Vec<String>,
    pub failed_devices: Vec<String>,
    pub error_devices: Vec<String>,
    pub errors: Vec<String>,
}

impl<T> Default for CriterionResult<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            passed_devices: Vec::new(),
            failed_devices: Vec::new(),
            error_devices: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> CriterionResult<T> {
    /// True when at least one device landed in any of the outcome sets.
    pub fn has_outcomes(&self) -> bool {
        !(self.passed_devices.is_empty()
            && self.failed_devices.is_empty()
            && self.error_devices.is_empty())
    }
}

pub type DataCompletenessResult = CriterionResult<DataCompleteness>;
pub type IntraSensorCorrelationResult = CriterionResult<IntraSensorCorrelation>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollocationBatchResult {
    pub data_completeness: DataCompletenessResult,
    pub statistics: Vec<JsonValue>,
    pub differences: CriterionResult<JsonValue>,
    pub intra_sensor_correlation: IntraSensorCorrelationResult,
    pub inter_sensor_correlation: CriterionResult<JsonValue>,
    pub data_source: String,
    pub errors: Vec<String>,
}

impl CollocationBatchResult {
    pub fn empty() -> Self {
        Self {
            data_completeness: CriterionResult::default(),
            statistics: Vec::new(),
            differences: CriterionResult::default(),
            intra_sensor_correlation: CriterionResult::default(),
            inter_sensor_correlation: CriterionResult::default(),
            data_source: String::new(),
            errors: Vec::new(),
        }
    }
}

impl Default for CollocationBatchResult {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceStatusSummary {
    pub title: String,
    pub description: String,
    pub status: CollocationDeviceStatus,
    pub action: String,
    pub extra_message: String,
    #[serde(rename = "type")]
    pub summary_type: DeviceStatusSummaryType,
}

/// Final verdict for one device: the batch-level rollup of all criteria.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollocationBatchResultSummary {
    pub device: String,
    pub status: CollocationDeviceStatus,
}

/// Flat per-device batch row for list views: batch identity, verdict and the
/// templated status messages in one record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollocationSummary {
    pub batch_id: String,
    pub batch_name: String,
    pub device_name: String,
    pub added_by: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: CollocationDeviceStatus,
    pub date_added: DateTime<Utc>,
    pub status_summary: Vec<DeviceStatusSummary>,
}

/// One side-by-side evaluation run over a fixed time window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollocationBatch {
    pub batch_id: String,
    pub batch_name: String,
    pub devices: Vec<String>,
    pub base_device: String,

    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub date_created: DateTime<Utc>,

    pub expected_hourly_records: i64,
    pub inter_correlation_threshold: f64,
    pub intra_correlation_threshold: f64,
    pub inter_correlation_r2_threshold: f64,
    pub intra_correlation_r2_threshold: f64,
    pub data_completeness_threshold: f64,
    pub differences_threshold: i64,

    pub data_completeness_parameter: String,
    pub inter_correlation_parameter: String,
    pub intra_correlation_parameter: String,
    pub differences_parameter: String,

    pub inter_correlation_additional_parameters: Vec<String>,

    pub created_by: JsonValue,

    pub status: CollocationBatchStatus,
    pub results: CollocationBatchResult,
    pub errors: Vec<String>,
}

impl CollocationBatch {
    /// Full batch state plus the computed per-device summary, shaped for the
    /// system boundary. The wire format itself belongs to the caller.
    pub fn to_api_output(&self) -> JsonValue {
        let mut data = serde_json::to_value(self).unwrap_or_default();
        if let JsonValue::Object(map) = &mut data {
            let summary = super::aggregate::summary(self);
            map.insert(
                "summary".to_string(),
                serde_json::to_value(summary).unwrap_or_default(),
            );
        }
        data
    }
}
