//! Budget Recommender
//!
//! Suggests a spending ceiling per category: the chosen percentile of the
//! category's historical transaction amounts. Pure order statistics, so
//! there is no model to fit and no fallback path.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::config::validate_percentile;
use crate::error::{Error, Result};
use crate::models::ExpenseRecord;

use super::engine::{settle, Analyzer, Outcome};
use super::normalize::{normalize, require_minimum};
use super::stats::{amounts_by_category, mean, percentile, safe_float};
use super::types::{AnalysisKind, BudgetRecommendation, BudgetReport, BudgetSummary};

/// Message reported when no usable record was supplied
pub const NO_DATA_MESSAGE: &str = "no data";

/// Recommends per-category budgets
pub struct BudgetRecommender {
    /// Percentile used as the ceiling (default 75)
    percentile: f64,
}

impl BudgetRecommender {
    pub fn new() -> Self {
        Self { percentile: 75.0 }
    }

    pub fn with_percentile(percentile: f64) -> Self {
        Self { percentile }
    }

    /// Recommend with an explicit analysis timestamp
    pub fn recommend_at(&self, records: &[ExpenseRecord], now: DateTime<Utc>) -> BudgetReport {
        settle(self.kind(), self.recommend(records, now))
    }

    fn recommend(&self, records: &[ExpenseRecord], now: DateTime<Utc>) -> Result<BudgetReport> {
        validate_percentile(self.percentile)?;

        let valid = normalize(records);
        if valid.is_empty() {
            return Ok(BudgetReport::insufficient(NO_DATA_MESSAGE));
        }
        require_minimum(valid.len())?;

        let mut recommendations = BTreeMap::new();
        for (category, amounts) in amounts_by_category(&valid)? {
            let recommended = percentile(&amounts, self.percentile).ok_or_else(|| {
                Error::InvalidData(format!("category '{}' has no amounts", category))
            })?;
            let stats = BudgetRecommendation {
                recommended_budget: safe_float(recommended),
                average_spent: safe_float(mean(&amounts).unwrap_or(0.0)),
                min_spent: safe_float(amounts.iter().copied().fold(f64::INFINITY, f64::min)),
                max_spent: safe_float(amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
                total_transactions: amounts.len(),
                based_on_percentile: self.percentile,
            };
            recommendations.insert(category, stats);
        }

        let all: Vec<f64> = valid.iter().map(|r| r.amount).collect();
        let summary = BudgetSummary {
            total_budget_recommended: safe_float(
                recommendations.values().map(|r| r.recommended_budget).sum(),
            ),
            total_spent: safe_float(all.iter().sum()),
            average_transaction: safe_float(mean(&all).unwrap_or(0.0)),
            analysis_date: now,
        };

        Ok(BudgetReport {
            recommendations,
            summary: Some(summary),
            message: None,
            error: None,
        })
    }
}

impl Default for BudgetRecommender {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for BudgetRecommender {
    type Report = BudgetReport;

    fn kind(&self) -> AnalysisKind {
        AnalysisKind::BudgetRecommendations
    }

    fn name(&self) -> &'static str {
        "Budget Recommender"
    }

    fn analyze(&self, records: &[ExpenseRecord]) -> BudgetReport {
        self.recommend_at(records, Utc::now())
    }
}

impl Outcome for BudgetReport {
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
