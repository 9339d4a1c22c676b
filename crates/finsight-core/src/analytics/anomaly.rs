//! Anomaly Detector
//!
//! Flags transactions that stand out from their category using an isolation
//! forest over three features:
//! - raw amount
//! - z-score against the category mean/std
//! - deviation relative to the category mean (`|x - mean| / (mean + 1)`)
//!
//! Small samples (10 or fewer records) use a fixed 5% contamination;
//! larger ones cap the requested contamination at `1 / n`.

use tracing::debug;

use crate::config::validate_contamination;
use crate::error::Result;
use crate::models::{ExpenseRecord, NormalizedExpense};

use super::engine::{settle, Analyzer, Outcome};
use super::isolation_forest::{fit_predict, ForestConfig};
use super::normalize::{normalize, require_minimum};
use super::stats::{category_stats, safe_float};
use super::types::{AnalysisKind, AnomalyReport, AnomalyResult};

/// Samples at or below this size use [`SMALL_SAMPLE_CONTAMINATION`]
const SMALL_SAMPLE_LIMIT: usize = 10;

const SMALL_SAMPLE_CONTAMINATION: f64 = 0.05;

/// Severity given to every flagged record when all scores tie
const TIED_SEVERITY: f64 = 0.5;

/// Detects anomalous transactions
pub struct AnomalyDetector {
    /// Expected anomaly proportion (default 0.1)
    contamination: f64,
}

impl AnomalyDetector {
    pub fn new() -> Self {
        Self { contamination: 0.1 }
    }

    pub fn with_contamination(contamination: f64) -> Self {
        Self { contamination }
    }

    fn detect(&self, records: &[ExpenseRecord]) -> Result<AnomalyReport> {
        validate_contamination(self.contamination)?;

        let valid = normalize(records);
        require_minimum(valid.len())?;

        let stats = category_stats(&valid)?;

        let features: Vec<Vec<f64>> = valid
            .iter()
            .map(|record| {
                let cat = &stats[record.category()?];
                let diff = (record.amount - cat.mean).abs();
                Ok(vec![
                    safe_float(record.amount),
                    safe_float(diff / cat.std),
                    safe_float(diff / (cat.mean + 1.0)),
                ])
            })
            .collect::<Result<_>>()?;

        let contamination = effective_contamination(self.contamination, valid.len());
        debug!(
            records = valid.len(),
            requested = self.contamination,
            contamination,
            "Running isolation forest"
        );

        let config = ForestConfig {
            contamination,
            ..Default::default()
        };
        let outliers = fit_predict(&features, &config)?;
        let severities = severities(&outliers.scores);

        let mut anomalies = Vec::new();
        for (i, record) in valid.iter().enumerate() {
            if !outliers.outliers[i] {
                continue;
            }
            let category = record.category()?;
            let category_average = stats[category].mean;
            anomalies.push(build_result(record, category, category_average, severities[i]));
        }

        // Stable sort keeps input order among equal severities
        anomalies.sort_by(|a, b| b.severity.total_cmp(&a.severity));

        let total = valid.len();
        Ok(AnomalyReport {
            anomaly_count: anomalies.len(),
            total_transactions: total,
            anomaly_percentage: safe_float(anomalies.len() as f64 / total as f64 * 100.0),
            anomalies,
            message: None,
            error: None,
        })
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for AnomalyDetector {
    type Report = AnomalyReport;

    fn kind(&self) -> AnalysisKind {
        AnalysisKind::AnomalyDetection
    }

    fn name(&self) -> &'static str {
        "Anomaly Detector"
    }

    fn analyze(&self, records: &[ExpenseRecord]) -> AnomalyReport {
        settle(self.kind(), self.detect(records))
    }
}

impl Outcome for AnomalyReport {
    fn insufficient(message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            ..Default::default()
        }
    }

    fn failed(error: String) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

/// Contamination actually handed to the forest
fn effective_contamination(requested: f64, n: usize) -> f64 {
    if n > SMALL_SAMPLE_LIMIT {
        requested.min(1.0 / n as f64)
    } else {
        SMALL_SAMPLE_CONTAMINATION
    }
}

/// Rescale scores to [0, 1] with 1 = most anomalous (lowest score)
fn severities(scores: &[f64]) -> Vec<f64> {
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    scores
        .iter()
        .map(|&score| {
            if range > 0.0 {
                safe_float(1.0 - (score - min) / range).clamp(0.0, 1.0)
            } else {
                TIED_SEVERITY
            }
        })
        .collect()
}

fn build_result(
    record: &NormalizedExpense,
    category: &str,
    category_average: f64,
    severity: f64,
) -> AnomalyResult {
    let deviation = if category_average > 0.0 {
        (record.amount - category_average) / category_average * 100.0
    } else {
        0.0
    };
    let deviation = safe_float(deviation);

    AnomalyResult {
        date: record.raw_date.clone(),
        category: category.to_string(),
        amount: safe_float(record.amount),
        description: record
            .description
            .clone()
            .unwrap_or_else(|| "N/A".to_string()),
        severity,
        category_average: safe_float(category_average),
        deviation_percent: deviation,
        reason: format!(
            "Deviation of {:.1}% from the category average",
            deviation.abs()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::records;

    fn grocery_spike() -> Vec<ExpenseRecord> {
        records(&[
            ("groceries", 20.0, "2024-01-01"),
            ("groceries", 20.0, "2024-01-02"),
            ("groceries", 20.0, "2024-01-03"),
            ("groceries", 20.0, "2024-01-04"),
            ("groceries", 500.0, "2024-01-05"),
        ])
    }

    #[test]
    fn test_effective_contamination() {
        assert_eq!(effective_contamination(0.1, 5), 0.05);
        assert_eq!(effective_contamination(0.5, 10), 0.05);
        assert_eq!(effective_contamination(0.1, 20), 0.05);
        assert_eq!(effective_contamination(0.01, 20), 0.01);
    }

    #[test]
    fn test_severities() {
        assert_eq!(severities(&[-0.25, -0.75, -0.5]), vec![0.0, 1.0, 0.5]);
        assert_eq!(severities(&[-0.5, -0.5]), vec![0.5, 0.5]);
    }

    #[test]
    fn test_single_spike_flagged() {
        let report = AnomalyDetector::new().analyze(&grocery_spike());

        assert!(report.error.is_none(), "{:?}", report.error);
        assert_eq!(report.anomaly_count, 1);
        assert_eq!(report.total_transactions, 5);
        assert_eq!(report.anomaly_percentage, 20.0);

        let spike = &report.anomalies[0];
        assert_eq!(spike.amount, 500.0);
        assert_eq!(spike.date, "2024-01-05");
        assert_eq!(spike.description, "N/A");
        assert!(spike.severity > 0.99);
        assert_eq!(spike.category_average, 116.0);
        // (500 - 116) / 116
        assert!((spike.deviation_percent - 331.034_482_758).abs() < 1e-6);
        assert_eq!(spike.reason, "Deviation of 331.0% from the category average");
    }

    #[test]
    fn test_large_sample_sorted_and_bounded() {
        let mut input = Vec::new();
        for day in 1..=28 {
            let date = format!("2024-02-{:02}", day);
            input.push(ExpenseRecord::new("dining", 30.0 + (day % 4) as f64, &date));
            input.push(ExpenseRecord::new("transport", 12.0 + (day % 3) as f64, &date));
        }
        input.push(ExpenseRecord::new("dining", 400.0, "2024-02-15").with_description("Party"));

        let report = AnomalyDetector::with_contamination(0.2).analyze(&input);
        assert!(report.error.is_none());
        assert_eq!(report.anomaly_count, 1);
        assert_eq!(report.total_transactions, 57);
        assert!(report
            .anomalies
            .windows(2)
            .all(|w| w[0].severity >= w[1].severity));
        for anomaly in &report.anomalies {
            assert!((0.0..=1.0).contains(&anomaly.severity));
            assert!(anomaly.deviation_percent.is_finite());
        }
        assert_eq!(report.anomalies[0].amount, 400.0);
        assert_eq!(report.anomalies[0].description, "Party");
    }

    #[test]
    fn test_reproducible() {
        let detector = AnomalyDetector::new();
        let a = serde_json::to_string(&detector.analyze(&grocery_spike())).unwrap();
        let b = serde_json::to_string(&detector.analyze(&grocery_spike())).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_insufficient_data() {
        let input = records(&[("food", 1.0, "2024-01-01"); 4]);
        let report = AnomalyDetector::new().analyze(&input);
        assert_eq!(report.message.as_deref(), Some("insufficient data"));
        assert!(report.anomalies.is_empty());
        assert!(report.error.is_none());
    }

    #[test]
    fn test_unparsable_amounts_count_against_minimum() {
        let mut input = grocery_spike();
        input[0].amount = serde_json::json!("n/a");
        let report = AnomalyDetector::new().analyze(&input);
        assert_eq!(report.message.as_deref(), Some("insufficient data"));
    }

    #[test]
    fn test_missing_category_reports_error() {
        let mut input = grocery_spike();
        input[2].category = None;
        let report = AnomalyDetector::new().analyze(&input);
        assert!(report.error.is_some());
        assert!(report.anomalies.is_empty());
    }

    #[test]
    fn test_invalid_contamination_reports_error() {
        let report = AnomalyDetector::with_contamination(1.5).analyze(&grocery_spike());
        assert!(report.error.unwrap().contains("contamination"));
    }

    #[test]
    fn test_extreme_amounts_report_instead_of_panicking() {
        let input = records(&[
            ("a", 1e308, "2024-01-01"),
            ("a", -1e308, "2024-01-02"),
            ("a", 1.0, "2024-01-03"),
            ("a", 2.0, "2024-01-04"),
            ("a", 3.0, "2024-01-05"),
        ]);
        let report = AnomalyDetector::new().analyze(&input);

        assert!(report.error.is_none(), "{:?}", report.error);
        assert_eq!(report.total_transactions, 5);
        for anomaly in &report.anomalies {
            assert!((0.0..=1.0).contains(&anomaly.severity));
            assert!(anomaly.deviation_percent.is_finite());
            assert!(anomaly.category_average.is_finite());
        }
    }

    #[test]
    fn test_zero_mean_category_has_zero_deviation() {
        let mut input = records(&[
            ("refunds", -20.0, "2024-01-01"),
            ("refunds", -20.0, "2024-01-02"),
            ("refunds", -20.0, "2024-01-03"),
            ("refunds", -20.0, "2024-01-04"),
        ]);
        input.push(ExpenseRecord::new("refunds", 80.0, "2024-01-05"));

        let report = AnomalyDetector::new().analyze(&input);
        assert!(report.error.is_none());
        assert_eq!(report.anomaly_count, 1);
        // mean is 0, so deviation is reported as 0
        assert_eq!(report.anomalies[0].deviation_percent, 0.0);
    }
}
