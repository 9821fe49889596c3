use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::collocation::types::{CollocationBatch, CollocationBatchResult, CollocationBatchStatus};
use crate::error::{CollocationError, EngineResult};

/// Batch definition as it arrives at the scheduling boundary. Thresholds are
/// kept loosely typed (JSON number or numeric string) so every malformed
/// field can be reported in one pass instead of failing on the first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollocationBatchRequest {
    pub batch_name: String,
    pub devices: Vec<String>,
    pub base_device: String,

    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    pub expected_hourly_records: JsonValue,
    pub data_completeness_threshold: JsonValue,
    pub intra_correlation_threshold: JsonValue,
    pub inter_correlation_threshold: JsonValue,
    pub intra_correlation_r2_threshold: JsonValue,
    pub inter_correlation_r2_threshold: JsonValue,
    pub differences_threshold: JsonValue,

    pub data_completeness_parameter: String,
    pub inter_correlation_parameter: String,
    pub intra_correlation_parameter: String,
    pub differences_parameter: String,

    #[serde(default)]
    pub inter_correlation_additional_parameters: Vec<String>,

    #[serde(default)]
    pub created_by: JsonValue,
}

impl CollocationBatchRequest {
    /// Coerces and range-checks the request, producing a typed batch in the
    /// `Scheduled` state with empty results. Violations are collected, never
    /// short-circuited: the error message names every offending field.
    pub fn into_batch(self, now: DateTime<Utc>) -> EngineResult<CollocationBatch> {
        let mut errors: Vec<String> = Vec::new();

        if self.end_date <= self.start_date {
            errors.push("End date must be greater than the start date".to_string());
        }

        let data_completeness_threshold =
            require_float(&self.data_completeness_threshold, "Data completeness", &mut errors);
        let intra_correlation_threshold = require_float(
            &self.intra_correlation_threshold,
            "Intra correlation threshold",
            &mut errors,
        );
        let inter_correlation_threshold = require_float(
            &self.inter_correlation_threshold,
            "Inter correlation threshold",
            &mut errors,
        );
        let intra_correlation_r2_threshold = require_float(
            &self.intra_correlation_r2_threshold,
            "Intra R2 correlation threshold",
            &mut errors,
        );
        let inter_correlation_r2_threshold = require_float(
            &self.inter_correlation_r2_threshold,
            "Inter R2 correlation threshold",
            &mut errors,
        );
        let differences_threshold =
            require_int(&self.differences_threshold, "Differences threshold", &mut errors);
        let expected_hourly_records =
            require_int(&self.expected_hourly_records, "Expected hourly records", &mut errors);

        if !errors.is_empty() {
            return Err(CollocationError::validation(errors.join(", ")));
        }

        let batch = CollocationBatch {
            batch_id: Uuid::new_v4().to_string(),
            batch_name: self.batch_name,
            devices: self.devices,
            base_device: self.base_device,
            start_date: self.start_date,
            end_date: self.end_date,
            date_created: now,
            expected_hourly_records,
            inter_correlation_threshold,
            intra_correlation_threshold,
            inter_correlation_r2_threshold,
            intra_correlation_r2_threshold,
            data_completeness_threshold,
            differences_threshold,
            data_completeness_parameter: self.data_completeness_parameter,
            inter_correlation_parameter: self.inter_correlation_parameter,
            intra_correlation_parameter: self.intra_correlation_parameter,
            differences_parameter: self.differences_parameter,
            inter_correlation_additional_parameters: self.inter_correlation_additional_parameters,
            created_by: self.created_by,
            status: CollocationBatchStatus::Scheduled,
            results: CollocationBatchResult::empty(),
            errors: Vec::new(),
        };

        batch.validate()?;
        Ok(batch)
    }

    pub fn validate(&self, now: DateTime<Utc>) -> EngineResult<()> {
        self.clone().into_batch(now).map(|_| ())
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.validate(now).is_ok()
    }
}

impl CollocationBatch {
    /// Re-validates an already-typed batch: date ordering, threshold ranges
    /// and structural fields. All violations are collected before reporting.
    pub fn validate(&self) -> EngineResult<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.end_date <= self.start_date {
            errors.push("End date must be greater than the start date".to_string());
        }

        let ratio_checks = [
            (
                self.data_completeness_threshold,
                "Data completeness threshold should range from 0 to 1",
            ),
            (
                self.intra_correlation_threshold,
                "Intra correlation threshold should range from 0 to 1",
            ),
            (
                self.inter_correlation_threshold,
                "Inter correlation threshold should range from 0 to 1",
            ),
            (
                self.intra_correlation_r2_threshold,
                "Intra R2 correlation threshold should range from 0 to 1",
            ),
            (
                self.inter_correlation_r2_threshold,
                "Inter R2 correlation threshold should range from 0 to 1",
            ),
        ];
        for (value, message) in ratio_checks {
            if !(0.0..=1.0).contains(&value) {
                errors.push(message.to_string());
            }
        }

        if self.differences_threshold < 0 {
            errors.push("Differences threshold should be greater than 0".to_string());
        }
        if self.expected_hourly_records < 0 {
            errors.push("Expected records per hour should be greater than 0".to_string());
        }
        if self.devices.is_empty() {
            errors.push("Devices cannot be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CollocationError::validation(errors.join(", ")))
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

fn require_float(value: &JsonValue, label: &str, errors: &mut Vec<String>) -> f64 {
    match coerce_float(value) {
        Some(parsed) => parsed,
        None => {
            errors.push(format!("{label}: {} is not a valid float.", render(value)));
            f64::NAN
        }
    }
}

fn require_int(value: &JsonValue, label: &str, errors: &mut Vec<String>) -> i64 {
    match coerce_int(value) {
        Some(parsed) => parsed,
        None => {
            errors.push(format!("{label}: {} is not a valid integer.", render(value)));
            0
        }
    }
}

fn coerce_float(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(number) => number.as_f64(),
        JsonValue::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn coerce_int(value: &JsonValue) -> Option<i64> {
    match value {
        // Fractional numbers truncate for integer fields.
        JsonValue::Number(number) => number.as_i64().or_else(|| number.as_f64().map(|f| f as i64)),
        JsonValue::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn render(value: &JsonValue) -> String {
    match value {
        JsonValue::String(text) => text.clone(),
        other => other.to_string(),
    }
}
