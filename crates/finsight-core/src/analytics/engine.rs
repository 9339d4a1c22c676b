//! Analytics Engine - runs analyzers and settles their outcomes

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::AnalysisParams;
use crate::error::{Error, Result};
use crate::models::ExpenseRecord;

use super::normalize::INSUFFICIENT_DATA_MESSAGE;
use super::types::{AnalysisKind, FullReport};
use super::{AnomalyDetector, BudgetRecommender, Forecaster, PatternAnalyzer};

/// A stateless one-shot analysis over a batch of records
pub trait Analyzer {
    type Report: Serialize;

    /// Which analysis this is
    fn kind(&self) -> AnalysisKind;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Analyze records; never fails, problems are reported in the result
    fn analyze(&self, records: &[ExpenseRecord]) -> Self::Report;
}

/// Reports that can stand in for a result that could not be computed
pub(crate) trait Outcome: Sized {
    fn insufficient(message: &str) -> Self;
    fn failed(error: String) -> Self;
}

/// Turn an internal result into a report, logging what went wrong
pub(crate) fn settle<R: Outcome>(kind: AnalysisKind, result: Result<R>) -> R {
    match result {
        Ok(report) => report,
        Err(Error::InsufficientData(detail)) => {
            debug!(analysis = kind.as_str(), %detail, "Skipping analysis");
            R::insufficient(INSUFFICIENT_DATA_MESSAGE)
        }
        Err(e) => {
            warn!(analysis = kind.as_str(), error = %e, "Analysis failed");
            R::failed(e.to_string())
        }
    }
}

/// Runs all four analyzers with one set of parameters
pub struct AnalyticsEngine {
    params: AnalysisParams,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(AnalysisParams::default())
    }
}

impl AnalyticsEngine {
    pub fn new(params: AnalysisParams) -> Self {
        Self { params }
    }

    pub fn anomaly_detector(&self) -> AnomalyDetector {
        AnomalyDetector::with_contamination(self.params.contamination)
    }

    pub fn forecaster(&self) -> Forecaster {
        Forecaster::with_horizon(self.params.days_ahead, self.params.by_category)
    }

    pub fn budget_recommender(&self) -> BudgetRecommender {
        BudgetRecommender::with_percentile(self.params.percentile)
    }

    pub fn pattern_analyzer(&self) -> PatternAnalyzer {
        PatternAnalyzer::new()
    }

    /// Run every analysis over the same records
    pub fn analyze_all(&self, records: &[ExpenseRecord]) -> FullReport {
        let report = FullReport {
            anomalies: self.anomaly_detector().analyze(records),
            forecast: self.forecaster().analyze(records),
            budget: self.budget_recommender().analyze(records),
            patterns: self.pattern_analyzer().analyze(records),
        };

        info!(
            records = records.len(),
            anomalies = report.anomalies.anomaly_count,
            forecast_points = report.forecast.total_prediction_points,
            budgets = report.budget.recommendations.len(),
            "Analysis complete"
        );

        report
    }

    /// Names of the available analyses
    pub fn analysis_kinds(&self) -> Vec<AnalysisKind> {
        AnalysisKind::all().to_vec()
    }
}
