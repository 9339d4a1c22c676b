//! Expense Analytics
//!
//! Four stateless analyses over a batch of expense records. Each one
//! normalizes its own copy of the input and always returns a report:
//! missing data becomes a `message`, failures become an `error`.
//!
//! ## Analyses
//!
//! - **Anomaly Detector** - flags outlying transactions per category
//! - **Forecaster** - predicts daily spending with confidence bounds
//! - **Budget Recommender** - percentile-based category budgets
//! - **Pattern Analyzer** - trend, volatility, top categories, peak day
//!
//! ## Usage
//!
//! ```rust,ignore
//! use finsight_core::analytics::AnalyticsEngine;
//!
//! let engine = AnalyticsEngine::new(AnalysisParams::load()?);
//! let report = engine.analyze_all(&records);
//! ```

pub mod anomaly;
pub mod budget;
pub mod engine;
pub mod forecast;
pub mod isolation_forest;
pub mod normalize;
pub mod patterns;
pub mod seasonal;
pub mod stats;
pub mod types;

pub use anomaly::AnomalyDetector;
pub use budget::BudgetRecommender;
pub use engine::{AnalyticsEngine, Analyzer};
pub use forecast::Forecaster;
pub use patterns::PatternAnalyzer;
pub use types::*;
