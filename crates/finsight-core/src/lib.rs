//! Finsight Core Library
//!
//! Expense analytics for categorized spending records:
//! - Record import from JSON and CSV
//! - Normalization with safe numeric coercion
//! - Anomaly detection with a seeded isolation forest
//! - Daily expense forecasting with a trend + weekly seasonal model
//! - Percentile-based budget recommendations
//! - Spending pattern analysis

pub mod analytics;
pub mod config;
pub mod error;
pub mod import;
pub mod models;

#[cfg(test)]
mod test_utils;

pub use analytics::{
    AnalysisKind, AnalyticsEngine, Analyzer, AnomalyDetector, AnomalyReport, BudgetRecommender,
    BudgetReport, ForecastReport, Forecaster, FullReport, PatternAnalyzer, PatternReport,
};
pub use config::AnalysisParams;
pub use error::{Error, Result};
pub use import::{load_records, parse_csv_records, parse_json_records, RecordFormat};
pub use models::{ExpenseRecord, NormalizedExpense};
