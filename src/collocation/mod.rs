mod aggregate;
mod diagnostics;
mod evaluator;
mod lifecycle;
mod request;
pub mod types;

pub use aggregate::{aggregate, summary, DeviceVerdicts};
pub use diagnostics::{batch_summaries, device_diagnostics};
pub use evaluator::{
    CriterionEvaluator, DataCompletenessEvaluator, DeviceCorrelation, DeviceDifference,
    DeviceRecordCount, DifferencesEvaluator, InterSensorCorrelationEvaluator,
    IntraSensorCorrelationEvaluator, IntraSensorStats,
};
pub use lifecycle::{
    compute_status, has_results, logical_end_date, refresh_status, DATA_SETTLING_GRACE_MINUTES,
};
pub use request::CollocationBatchRequest;
