use chrono::{DateTime, Duration, Utc};

use crate::collocation::types::{CollocationBatch, CollocationBatchStatus};

/// Grace period after the configured end date for a final data-settling
/// window before a batch may be considered complete.
pub const DATA_SETTLING_GRACE_MINUTES: i64 = 90;

pub fn logical_end_date(batch: &CollocationBatch) -> DateTime<Utc> {
    batch.end_date + Duration::minutes(DATA_SETTLING_GRACE_MINUTES)
}

/// True iff every criterion recorded at least one device outcome. A batch
/// past its logical end date with no evidence stays `Running` so stalled
/// evaluations surface instead of silently completing.
pub fn has_results(batch: &CollocationBatch) -> bool {
    let results = &batch.results;
    results.data_completeness.has_outcomes()
        && results.intra_sensor_correlation.has_outcomes()
        && results.inter_sensor_correlation.has_outcomes()
        && results.differences.has_outcomes()
}

/// Pure status computation over the injected clock.
pub fn compute_status(batch: &CollocationBatch, now: DateTime<Utc>) -> CollocationBatchStatus {
    if now < batch.start_date {
        CollocationBatchStatus::Scheduled
    } else if now >= logical_end_date(batch) && has_results(batch) {
        CollocationBatchStatus::Completed
    } else {
        CollocationBatchStatus::Running
    }
}

/// Recomputes and stores the batch status. Callers decide when this runs;
/// nothing is memoized between calls.
pub fn refresh_status(batch: &mut CollocationBatch, now: DateTime<Utc>) -> CollocationBatchStatus {
    let next = compute_status(batch, now);
    if next != batch.status {
        tracing::debug!(
            batch_id = %batch.batch_id,
            from = ?batch.status,
            to = ?next,
            "collocation batch status change"
        );
    }
    batch.status = next;
    next
}
