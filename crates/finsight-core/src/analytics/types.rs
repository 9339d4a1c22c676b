//! Result types for the analytics modules
//!
//! Every result is JSON-serializable and carries only finite floats. A
//! module that could not run reports `message` (insufficient data) or
//! `error` (computation failure) next to an empty primary collection.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The four analyses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Flags unusual transactions
    AnomalyDetection,
    /// Forecasts daily spending
    ExpensePrediction,
    /// Suggests per-category budget ceilings
    BudgetRecommendations,
    /// Summarizes trend, volatility and concentration
    PatternAnalysis,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::AnomalyDetection => "anomaly_detection",
            AnalysisKind::ExpensePrediction => "expense_prediction",
            AnalysisKind::BudgetRecommendations => "budget_recommendations",
            AnalysisKind::PatternAnalysis => "pattern_analysis",
        }
    }

    pub fn all() -> &'static [AnalysisKind] {
        &[
            AnalysisKind::AnomalyDetection,
            AnalysisKind::ExpensePrediction,
            AnalysisKind::BudgetRecommendations,
            AnalysisKind::PatternAnalysis,
        ]
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anomaly_detection" => Ok(AnalysisKind::AnomalyDetection),
            "expense_prediction" => Ok(AnalysisKind::ExpensePrediction),
            "budget_recommendations" => Ok(AnalysisKind::BudgetRecommendations),
            "pattern_analysis" => Ok(AnalysisKind::PatternAnalysis),
            _ => Err(format!("Unknown analysis: {}", s)),
        }
    }
}

// ========== Anomalies ==========

/// One flagged transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    pub date: String,
    pub category: String,
    pub amount: f64,
    pub description: String,
    /// In [0, 1], 1 = most anomalous
    pub severity: f64,
    pub category_average: f64,
    pub deviation_percent: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnomalyReport {
    /// Sorted by descending severity
    pub anomalies: Vec<AnomalyResult>,
    pub anomaly_count: usize,
    pub total_transactions: usize,
    pub anomaly_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ========== Forecast ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_amount: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// How a series was projected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    /// Linear trend with optional weekly seasonality
    Seasonal,
    /// Flat mean ± std projection
    MovingAverage,
}

impl ForecastMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastMethod::Seasonal => "seasonal",
            ForecastMethod::MovingAverage => "moving_average",
        }
    }
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastReport {
    /// Series key (category or `"total"`) to chronological points
    pub predictions: BTreeMap<String, Vec<ForecastPoint>>,
    pub methods: BTreeMap<String, ForecastMethod>,
    pub prediction_period_days: usize,
    pub total_prediction_points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ========== Budget ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecommendation {
    pub recommended_budget: f64,
    pub average_spent: f64,
    pub min_spent: f64,
    pub max_spent: f64,
    pub total_transactions: usize,
    pub based_on_percentile: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    /// Sum of the per-category recommended budgets
    pub total_budget_recommended: f64,
    pub total_spent: f64,
    pub average_transaction: f64,
    pub analysis_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BudgetReport {
    pub recommendations: BTreeMap<String, BudgetRecommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<BudgetSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ========== Patterns ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn from_change(percentage_change: f64) -> Self {
        if percentage_change > 0.0 {
            TrendDirection::Increasing
        } else if percentage_change < 0.0 {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingTrend {
    pub direction: TrendDirection,
    pub percentage_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakDay {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Serializes as `{}` when nothing could be computed
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpendingPatterns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spending_trend: Option<SpendingTrend>,
    /// Coefficient of variation per category
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub category_volatility: BTreeMap<String, f64>,
    /// At most five, descending by total
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_categories: Vec<CategoryTotal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest_spending_day: Option<PeakDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PatternReport {
    pub patterns: SpendingPatterns,
    pub data_points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ========== Full report ==========

/// All four analyses over the same records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullReport {
    pub anomalies: AnomalyReport,
    pub forecast: ForecastReport,
    pub budget: BudgetReport,
    pub patterns: PatternReport,
}
