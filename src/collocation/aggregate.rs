use std::collections::BTreeSet;

use serde::Serialize;

use crate::collocation::types::{
    CollocationBatch, CollocationBatchResult, CollocationBatchResultSummary,
    CollocationBatchStatus, CollocationDeviceStatus,
};

/// Overall per-device verdicts. Ordered sets keep aggregation output
/// deterministic across calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceVerdicts {
    pub passed: BTreeSet<String>,
    pub failed: BTreeSet<String>,
    pub error: BTreeSet<String>,
}

/// Combines the four criterion results into overall verdict sets.
///
/// The combination rule is intentionally asymmetric: a device must pass
/// every criterion to be passed, failing any single criterion is enough to
/// be failed, and only erroring in all four makes it an overall error. A
/// device with partial outcomes can land in no set at all; those are logged
/// and omitted downstream rather than given an invented verdict.
pub fn aggregate(batch: &CollocationBatch) -> DeviceVerdicts {
    let results = &batch.results;

    let passed = intersect_all([
        &results.data_completeness.passed_devices,
        &results.intra_sensor_correlation.passed_devices,
        &results.inter_sensor_correlation.passed_devices,
        &results.differences.passed_devices,
    ]);
    let failed = union_all([
        &results.data_completeness.failed_devices,
        &results.intra_sensor_correlation.failed_devices,
        &results.inter_sensor_correlation.failed_devices,
        &results.differences.failed_devices,
    ]);
    let error = intersect_all([
        &results.data_completeness.error_devices,
        &results.intra_sensor_correlation.error_devices,
        &results.inter_sensor_correlation.error_devices,
        &results.differences.error_devices,
    ]);

    for device in &batch.devices {
        if !passed.contains(device)
            && !failed.contains(device)
            && !error.contains(device)
            && has_any_outcome(results, device)
        {
            tracing::warn!(
                batch_id = %batch.batch_id,
                device = %device,
                "device has partial criterion outcomes but no overall verdict"
            );
        }
    }

    DeviceVerdicts { passed, failed, error }
}

/// Per-device verdict rows. Scheduled and running batches report a blanket
/// status for every configured device; completed batches report the
/// set-derived verdicts, omitting devices that landed in no set.
pub fn summary(batch: &CollocationBatch) -> Vec<CollocationBatchResultSummary> {
    match batch.status {
        CollocationBatchStatus::Scheduled => {
            blanket_summary(batch, CollocationDeviceStatus::Scheduled)
        }
        CollocationBatchStatus::Running => blanket_summary(batch, CollocationDeviceStatus::Running),
        CollocationBatchStatus::Completed => {
            let verdicts = aggregate(batch);
            let mut rows = Vec::new();
            rows.extend(verdicts.passed.iter().map(|device| CollocationBatchResultSummary {
                device: device.clone(),
                status: CollocationDeviceStatus::Passed,
            }));
            rows.extend(verdicts.failed.iter().map(|device| CollocationBatchResultSummary {
                device: device.clone(),
                status: CollocationDeviceStatus::Failed,
            }));
            rows.extend(verdicts.error.iter().map(|device| CollocationBatchResultSummary {
                device: device.clone(),
                status: CollocationDeviceStatus::Error,
            }));
            rows
        }
    }
}

fn blanket_summary(
    batch: &CollocationBatch,
    status: CollocationDeviceStatus,
) -> Vec<CollocationBatchResultSummary> {
    batch
        .devices
        .iter()
        .map(|device| CollocationBatchResultSummary {
            device: device.clone(),
            status,
        })
        .collect()
}

fn has_any_outcome(results: &CollocationBatchResult, device: &str) -> bool {
    let criteria = [
        (
            &results.data_completeness.passed_devices,
            &results.data_completeness.failed_devices,
            &results.data_completeness.error_devices,
        ),
        (
            &results.intra_sensor_correlation.passed_devices,
            &results.intra_sensor_correlation.failed_devices,
            &results.intra_sensor_correlation.error_devices,
        ),
        (
            &results.inter_sensor_correlation.passed_devices,
            &results.inter_sensor_correlation.failed_devices,
            &results.inter_sensor_correlation.error_devices,
        ),
        (
            &results.differences.passed_devices,
            &results.differences.failed_devices,
            &results.differences.error_devices,
        ),
    ];
    criteria.iter().any(|(passed, failed, error)| {
        passed.iter().any(|name| name == device)
            || failed.iter().any(|name| name == device)
            || error.iter().any(|name| name == device)
    })
}

fn to_set(devices: &[String]) -> BTreeSet<String> {
    devices.iter().cloned().collect()
}

fn intersect_all(sets: [&Vec<String>; 4]) -> BTreeSet<String> {
    let mut iter = sets.into_iter();
    let mut acc = iter.next().map(|devices| to_set(devices)).unwrap_or_default();
    for devices in iter {
        let other = to_set(devices);
        acc = acc.intersection(&other).cloned().collect();
    }
    acc
}

fn union_all(sets: [&Vec<String>; 4]) -> BTreeSet<String> {
    let mut acc = BTreeSet::new();
    for devices in sets {
        acc.extend(devices.iter().cloned());
    }
    acc
}
