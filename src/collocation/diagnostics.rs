use std::collections::{BTreeMap, BTreeSet};

use crate::collocation::aggregate;
use crate::collocation::types::{
    CollocationBatch, CollocationDeviceStatus, CollocationSummary, DeviceStatusSummary,
    DeviceStatusSummaryType,
};

const ACTION_ALL_GOOD: &str = "All good";
const ACTION_ADJUST_COMPLETENESS: &str = "Adjust completeness threshold";
const ACTION_ADJUST_CORRELATION: &str = "Adjust Correlation threshold";
const ACTION_ADJUST_DIFFERENCES: &str = "Adjust differences threshold";

/// Expands the batch's results and configured thresholds into per-device
/// status messages, one record per criterion that produced an outcome for
/// the device. Every number in the text comes from the batch configuration
/// or the detail record, never from a hard-coded constant.
pub fn device_diagnostics(batch: &CollocationBatch) -> BTreeMap<String, Vec<DeviceStatusSummary>> {
    let mut status_summary: BTreeMap<String, Vec<DeviceStatusSummary>> = BTreeMap::new();
    for device in &batch.devices {
        status_summary.insert(device.clone(), Vec::new());
    }

    for detail in &batch.results.data_completeness.results {
        let description = format!(
            "Data completeness was {}%. Acceptable percentage was set to {}%. \
             A minimum of {} records are expected. Device sent {} records.",
            percent(detail.completeness),
            percent(batch.data_completeness_threshold),
            detail.expected,
            detail.actual,
        );
        let (title, status, action) = if detail.passed {
            (
                "Meets recommended data completeness",
                CollocationDeviceStatus::Passed,
                ACTION_ALL_GOOD,
            )
        } else {
            (
                "Doesn't meet recommended data completeness",
                CollocationDeviceStatus::Failed,
                ACTION_ADJUST_COMPLETENESS,
            )
        };
        push_summary(
            &mut status_summary,
            &batch.batch_id,
            &detail.device_name,
            DeviceStatusSummary {
                title: title.to_string(),
                description,
                status,
                action: action.to_string(),
                extra_message: title.to_string(),
                summary_type: DeviceStatusSummaryType::DataCompleteness,
            },
        );
    }

    for detail in &batch.results.intra_sensor_correlation.results {
        let pearson = detail
            .pm2_5_pearson
            .map(|value| value.to_string())
            .unwrap_or_else(|| "undefined".to_string());
        let description = format!(
            "PM2.5 pearson correlation was {pearson}. \
             Acceptable sensor to sensor correlation threshold was set to ≥ {} and R2 ≥ {}",
            batch.intra_correlation_threshold, batch.intra_correlation_r2_threshold,
        );
        let (title, status, action) = if detail.passed {
            (
                "Meets recommended sensor to sensor correlation",
                CollocationDeviceStatus::Passed,
                ACTION_ALL_GOOD,
            )
        } else {
            (
                "Doesn't meet recommended sensor to sensor correlation",
                CollocationDeviceStatus::Failed,
                ACTION_ADJUST_CORRELATION,
            )
        };
        push_summary(
            &mut status_summary,
            &batch.batch_id,
            &detail.device_name,
            DeviceStatusSummary {
                title: title.to_string(),
                description,
                status,
                action: action.to_string(),
                extra_message: title.to_string(),
                summary_type: DeviceStatusSummaryType::IntraSensorCorrelation,
            },
        );
    }

    for device in &batch.results.inter_sensor_correlation.passed_devices {
        let title = "Meets recommended device to device correlation";
        push_summary(
            &mut status_summary,
            &batch.batch_id,
            device,
            DeviceStatusSummary {
                title: title.to_string(),
                description: format!(
                    "Acceptable device to device correlation threshold was set to ≥ {} and R2 ≥ {}",
                    batch.inter_correlation_threshold, batch.inter_correlation_r2_threshold,
                ),
                status: CollocationDeviceStatus::Passed,
                action: ACTION_ALL_GOOD.to_string(),
                extra_message: title.to_string(),
                summary_type: DeviceStatusSummaryType::InterSensorCorrelation,
            },
        );
    }

    for device in &batch.results.differences.passed_devices {
        let title = "Meets recommended differences threshold";
        push_summary(
            &mut status_summary,
            &batch.batch_id,
            device,
            DeviceStatusSummary {
                title: title.to_string(),
                description: format!(
                    "Acceptable device to device differences threshold was set to ≤ {}",
                    batch.differences_threshold,
                ),
                status: CollocationDeviceStatus::Passed,
                action: ACTION_ALL_GOOD.to_string(),
                extra_message: title.to_string(),
                summary_type: DeviceStatusSummaryType::Differences,
            },
        );
    }

    for device in failed_or_error(
        &batch.results.inter_sensor_correlation.failed_devices,
        &batch.results.inter_sensor_correlation.error_devices,
    ) {
        let title = "Doesn't meet recommended device to device correlation";
        push_summary(
            &mut status_summary,
            &batch.batch_id,
            device,
            DeviceStatusSummary {
                title: title.to_string(),
                description: format!(
                    "Acceptable device to device correlation was set to ≥ {} and R2 ≥ {}",
                    batch.inter_correlation_threshold, batch.inter_correlation_r2_threshold,
                ),
                status: CollocationDeviceStatus::Failed,
                action: ACTION_ADJUST_CORRELATION.to_string(),
                extra_message: title.to_string(),
                summary_type: DeviceStatusSummaryType::InterSensorCorrelation,
            },
        );
    }

    for device in failed_or_error(
        &batch.results.differences.failed_devices,
        &batch.results.differences.error_devices,
    ) {
        let title = "Exceeds recommended differences threshold";
        push_summary(
            &mut status_summary,
            &batch.batch_id,
            device,
            DeviceStatusSummary {
                title: title.to_string(),
                description: format!(
                    "Acceptable device to device differences was set to ≤ {}",
                    batch.differences_threshold,
                ),
                status: CollocationDeviceStatus::Failed,
                action: ACTION_ADJUST_DIFFERENCES.to_string(),
                extra_message: title.to_string(),
                summary_type: DeviceStatusSummaryType::Differences,
            },
        );
    }

    status_summary
}

/// Flattens a batch into one list-view row per device with a verdict,
/// joining the summary statuses with the per-device diagnostics.
pub fn batch_summaries(batch: &CollocationBatch) -> Vec<CollocationSummary> {
    let mut diagnostics = device_diagnostics(batch);
    let added_by = creator_name(batch);

    aggregate::summary(batch)
        .into_iter()
        .map(|row| CollocationSummary {
            batch_id: batch.batch_id.clone(),
            batch_name: batch.batch_name.clone(),
            device_name: row.device.clone(),
            added_by: added_by.clone(),
            start_date: batch.start_date,
            end_date: batch.end_date,
            status: row.status,
            date_added: batch.date_created,
            status_summary: diagnostics.remove(&row.device).unwrap_or_default(),
        })
        .collect()
}

fn creator_name(batch: &CollocationBatch) -> String {
    let first = batch
        .created_by
        .get("first_name")
        .and_then(|value| value.as_str())
        .unwrap_or("");
    let last = batch
        .created_by
        .get("last_name")
        .and_then(|value| value.as_str())
        .unwrap_or("");
    format!("{first} {last}").trim().to_string()
}

fn failed_or_error<'a>(failed: &'a [String], error: &'a [String]) -> BTreeSet<&'a str> {
    let mut devices: BTreeSet<&str> = failed.iter().map(String::as_str).collect();
    devices.extend(error.iter().map(String::as_str));
    devices
}

fn push_summary(
    status_summary: &mut BTreeMap<String, Vec<DeviceStatusSummary>>,
    batch_id: &str,
    device: &str,
    record: DeviceStatusSummary,
) {
    match status_summary.get_mut(device) {
        Some(rows) => rows.push(record),
        None => {
            // Result rows for devices outside the configured list are never
            // surfaced; inventing a map entry would fabricate a verdict.
            tracing::warn!(
                batch_id = %batch_id,
                device = %device,
                "criterion result references a device outside the batch"
            );
        }
    }
}

/// Renders a ratio as a percentage rounded to two decimals, keeping at
/// least one decimal place so thresholds read as "90.0%" rather than "90%".
fn percent(ratio: f64) -> String {
    let value = (ratio * 100.0 * 100.0).round() / 100.0;
    let text = format!("{value:.2}");
    let trimmed = text.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}
