use serde_json::{json, Value as JsonValue};

use crate::collocation::types::{
    CriterionResult, DataCompleteness, DataCompletenessResult, IntraSensorCorrelation,
    IntraSensorCorrelationResult,
};

/// Capability seam between upstream statistics computation and this engine:
/// anything that can sort already-computed per-device statistics into one
/// criterion's result. The aggregation and diagnostic logic depend only on
/// the `CriterionResult` shape, never on how it was produced.
pub trait CriterionEvaluator {
    type Input;
    type Detail;

    fn evaluate(&self, inputs: &[Self::Input]) -> CriterionResult<Self::Detail>;
}

/// Hourly record count reported for one device. `actual` is `None` when the
/// upstream data fetch produced nothing for the device at all.
#[derive(Debug, Clone)]
pub struct DeviceRecordCount {
    pub device_name: String,
    pub actual: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
pub struct DataCompletenessEvaluator {
    pub expected: i64,
    pub threshold: f64,
}

impl CriterionEvaluator for DataCompletenessEvaluator {
    type Input = DeviceRecordCount;
    type Detail = DataCompleteness;

    fn evaluate(&self, inputs: &[DeviceRecordCount]) -> DataCompletenessResult {
        let mut result = CriterionResult::default();
        if self.expected <= 0 {
            result
                .errors
                .push(format!("Expected record count must be positive, got {}", self.expected));
            return result;
        }

        for input in inputs {
            let Some(actual) = input.actual else {
                result.error_devices.push(input.device_name.clone());
                result
                    .errors
                    .push(format!("{}: no records available for the collocation window", input.device_name));
                continue;
            };

            let completeness = actual as f64 / self.expected as f64;
            let passed = completeness >= self.threshold;
            result.results.push(DataCompleteness {
                device_name: input.device_name.clone(),
                expected: self.expected,
                actual,
                completeness,
                missing: 1.0 - completeness,
                passed,
            });
            if passed {
                result.passed_devices.push(input.device_name.clone());
            } else {
                result.failed_devices.push(input.device_name.clone());
            }
        }
        result
    }
}

/// Sensor-to-sensor agreement statistics for one device's two onboard
/// sensors, as computed upstream. Any statistic may be undefined.
#[derive(Debug, Clone)]
pub struct IntraSensorStats {
    pub device_name: String,
    pub pm2_5_pearson: Option<f64>,
    pub pm10_pearson: Option<f64>,
    pub pm2_5_r2: Option<f64>,
    pub pm10_r2: Option<f64>,
}

impl IntraSensorStats {
    fn is_empty(&self) -> bool {
        self.pm2_5_pearson.is_none()
            && self.pm10_pearson.is_none()
            && self.pm2_5_r2.is_none()
            && self.pm10_r2.is_none()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IntraSensorCorrelationEvaluator {
    pub correlation_threshold: f64,
    pub r2_threshold: f64,
}

impl CriterionEvaluator for IntraSensorCorrelationEvaluator {
    type Input = IntraSensorStats;
    type Detail = IntraSensorCorrelation;

    fn evaluate(&self, inputs: &[IntraSensorStats]) -> IntraSensorCorrelationResult {
        let mut result = CriterionResult::default();
        for stats in inputs {
            if stats.is_empty() {
                result.error_devices.push(stats.device_name.clone());
                result.errors.push(format!(
                    "{}: sensor correlation could not be computed",
                    stats.device_name
                ));
                continue;
            }

            // Null-safe pass flag: an undefined statistic fails the check.
            let passed = meets(stats.pm2_5_pearson, self.correlation_threshold)
                && meets(stats.pm10_pearson, self.correlation_threshold)
                && meets(stats.pm2_5_r2, self.r2_threshold)
                && meets(stats.pm10_r2, self.r2_threshold);

            result.results.push(IntraSensorCorrelation {
                device_name: stats.device_name.clone(),
                pm2_5_pearson: stats.pm2_5_pearson,
                pm10_pearson: stats.pm10_pearson,
                pm2_5_r2: stats.pm2_5_r2,
                pm10_r2: stats.pm10_r2,
                passed,
            });
            if passed {
                result.passed_devices.push(stats.device_name.clone());
            } else {
                result.failed_devices.push(stats.device_name.clone());
            }
        }
        result
    }
}

/// Device-versus-base-device agreement statistics, as computed upstream.
#[derive(Debug, Clone)]
pub struct DeviceCorrelation {
    pub device_name: String,
    pub pearson: Option<f64>,
    pub r2: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct InterSensorCorrelationEvaluator {
    pub correlation_threshold: f64,
    pub r2_threshold: f64,
}

impl CriterionEvaluator for InterSensorCorrelationEvaluator {
    type Input = DeviceCorrelation;
    type Detail = JsonValue;

    fn evaluate(&self, inputs: &[DeviceCorrelation]) -> CriterionResult<JsonValue> {
        let mut result = CriterionResult::default();
        for stats in inputs {
            let (Some(pearson), Some(r2)) = (stats.pearson, stats.r2) else {
                result.error_devices.push(stats.device_name.clone());
                result.errors.push(format!(
                    "{}: correlation with the base device could not be computed",
                    stats.device_name
                ));
                continue;
            };

            result.results.push(json!({
                "device_name": stats.device_name,
                "pearson": pearson,
                "r2": r2,
            }));
            if pearson >= self.correlation_threshold && r2 >= self.r2_threshold {
                result.passed_devices.push(stats.device_name.clone());
            } else {
                result.failed_devices.push(stats.device_name.clone());
            }
        }
        result
    }
}

/// Mean absolute difference between a device and the base device.
#[derive(Debug, Clone)]
pub struct DeviceDifference {
    pub device_name: String,
    pub difference: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct DifferencesEvaluator {
    pub threshold: i64,
}

impl CriterionEvaluator for DifferencesEvaluator {
    type Input = DeviceDifference;
    type Detail = JsonValue;

    fn evaluate(&self, inputs: &[DeviceDifference]) -> CriterionResult<JsonValue> {
        let mut result = CriterionResult::default();
        for input in inputs {
            let Some(difference) = input.difference else {
                result.error_devices.push(input.device_name.clone());
                result.errors.push(format!(
                    "{}: differences against the base device could not be computed",
                    input.device_name
                ));
                continue;
            };

            result.results.push(json!({
                "device_name": input.device_name,
                "difference": difference,
            }));
            if difference.abs() <= self.threshold as f64 {
                result.passed_devices.push(input.device_name.clone());
            } else {
                result.failed_devices.push(input.device_name.clone());
            }
        }
        result
    }
}

fn meets(value: Option<f64>, threshold: f64) -> bool {
    matches!(value, Some(v) if v >= threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(device: &str, actual: Option<i64>) -> DeviceRecordCount {
        DeviceRecordCount {
            device_name: device.to_string(),
            actual,
        }
    }

    #[test]
    fn completeness_derives_ratio_and_pass_flag() {
        let evaluator = DataCompletenessEvaluator {
            expected: 100,
            threshold: 0.9,
        };
        let result = evaluator.evaluate(&[count("aq-01", Some(95)), count("aq-02", Some(80))]);

        assert_eq!(result.passed_devices, vec!["aq-01".to_string()]);
        assert_eq!(result.failed_devices, vec!["aq-02".to_string()]);

        let first = &result.results[0];
        assert!((first.completeness - 0.95).abs() < 1e-12);
        assert!((first.missing - 0.05).abs() < 1e-12);
        assert!(first.passed);

        let second = &result.results[1];
        assert!((second.completeness - 0.80).abs() < 1e-12);
        assert!(!second.passed);
    }

    #[test]
    fn missing_record_counts_land_in_the_error_set() {
        let evaluator = DataCompletenessEvaluator {
            expected: 100,
            threshold: 0.9,
        };
        let result = evaluator.evaluate(&[count("aq-01", None)]);

        assert_eq!(result.error_devices, vec!["aq-01".to_string()]);
        assert!(result.results.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("aq-01"));
    }

    #[test]
    fn nonpositive_expected_count_is_an_engine_error() {
        let evaluator = DataCompletenessEvaluator {
            expected: 0,
            threshold: 0.9,
        };
        let result = evaluator.evaluate(&[count("aq-01", Some(10))]);
        assert!(!result.has_outcomes());
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn intra_correlation_requires_both_parameters_to_meet_thresholds() {
        let evaluator = IntraSensorCorrelationEvaluator {
            correlation_threshold: 0.98,
            r2_threshold: 0.95,
        };
        let stats = IntraSensorStats {
            device_name: "aq-01".to_string(),
            pm2_5_pearson: Some(0.99),
            pm10_pearson: Some(0.97),
            pm2_5_r2: Some(0.99),
            pm10_r2: Some(0.99),
        };

        let result = evaluator.evaluate(&[stats]);
        assert_eq!(result.failed_devices, vec!["aq-01".to_string()]);
        assert!(!result.results[0].passed);
    }

    #[test]
    fn undefined_statistic_is_a_null_safe_failure() {
        let evaluator = IntraSensorCorrelationEvaluator {
            correlation_threshold: 0.9,
            r2_threshold: 0.9,
        };
        let stats = IntraSensorStats {
            device_name: "aq-01".to_string(),
            pm2_5_pearson: Some(0.99),
            pm10_pearson: None,
            pm2_5_r2: Some(0.99),
            pm10_r2: Some(0.99),
        };

        let result = evaluator.evaluate(&[stats]);
        assert_eq!(result.failed_devices, vec!["aq-01".to_string()]);
        assert!(result.error_devices.is_empty());
        assert_eq!(result.results[0].pm10_pearson, None);
    }

    #[test]
    fn fully_absent_statistics_are_an_evaluation_error() {
        let evaluator = IntraSensorCorrelationEvaluator {
            correlation_threshold: 0.9,
            r2_threshold: 0.9,
        };
        let stats = IntraSensorStats {
            device_name: "aq-01".to_string(),
            pm2_5_pearson: None,
            pm10_pearson: None,
            pm2_5_r2: None,
            pm10_r2: None,
        };

        let result = evaluator.evaluate(&[stats]);
        assert_eq!(result.error_devices, vec!["aq-01".to_string()]);
        assert!(result.results.is_empty());
    }

    #[test]
    fn inter_correlation_sorts_against_both_thresholds() {
        let evaluator = InterSensorCorrelationEvaluator {
            correlation_threshold: 0.9,
            r2_threshold: 0.85,
        };
        let inputs = [
            DeviceCorrelation {
                device_name: "aq-01".to_string(),
                pearson: Some(0.95),
                r2: Some(0.90),
            },
            DeviceCorrelation {
                device_name: "aq-02".to_string(),
                pearson: Some(0.95),
                r2: Some(0.80),
            },
            DeviceCorrelation {
                device_name: "aq-03".to_string(),
                pearson: None,
                r2: None,
            },
        ];

        let result = evaluator.evaluate(&inputs);
        assert_eq!(result.passed_devices, vec!["aq-01".to_string()]);
        assert_eq!(result.failed_devices, vec!["aq-02".to_string()]);
        assert_eq!(result.error_devices, vec!["aq-03".to_string()]);
        assert_eq!(result.results.len(), 2);
    }

    #[test]
    fn differences_pass_on_the_threshold_boundary() {
        let evaluator = DifferencesEvaluator { threshold: 5 };
        let inputs = [
            DeviceDifference {
                device_name: "aq-01".to_string(),
                difference: Some(5.0),
            },
            DeviceDifference {
                device_name: "aq-02".to_string(),
                difference: Some(-7.5),
            },
            DeviceDifference {
                device_name: "aq-03".to_string(),
                difference: None,
            },
        ];

        let result = evaluator.evaluate(&inputs);
        assert_eq!(result.passed_devices, vec!["aq-01".to_string()]);
        assert_eq!(result.failed_devices, vec!["aq-02".to_string()]);
        assert_eq!(result.error_devices, vec!["aq-03".to_string()]);
    }
}
