//! Pattern Analyzer
//!
//! Summarizes dated spending: first-to-last daily trend, per-category
//! coefficient of variation, the top five categories by total and the
//! single most expensive day.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::ExpenseRecord;

use super::engine::{settle, Analyzer, Outcome};
use super::normalize::{dated, normalize, require_minimum};
use super::stats::{daily_totals, mean, safe_float, sample_std};
use super::types::{
    AnalysisKind, CategoryTotal, DateRange, PatternReport, PeakDay, SpendingPatterns,
    SpendingTrend, TrendDirection,
};

/// Number of categories listed in `top_categories`
const TOP_CATEGORIES: usize = 5;

/// Extracts spending patterns
pub struct PatternAnalyzer;

impl PatternAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn analyze_patterns(&self, records: &[ExpenseRecord]) -> Result<PatternReport> {
        let valid = normalize(records);
        let dated = dated(&valid);
        require_minimum(dated.len())?;

        let mut by_category: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for (_, record) in &dated {
            by_category
                .entry(record.category()?)
                .or_default()
                .push(record.amount);
        }

        let daily = daily_totals(dated.iter().map(|(d, r)| (*d, *r)));
        let date_range = match (daily.keys().next(), daily.keys().next_back()) {
            (Some(start), Some(end)) => Some(DateRange {
                start: *start,
                end: *end,
            }),
            _ => None,
        };

        let patterns = SpendingPatterns {
            spending_trend: spending_trend(&daily),
            category_volatility: by_category
                .iter()
                .map(|(category, amounts)| (category.to_string(), volatility(amounts)))
                .collect(),
            top_categories: top_categories(&by_category),
            highest_spending_day: peak_day(&daily),
        };

        Ok(PatternReport {
            patterns,
            data_points: dated.len(),
            date_range,
            message: None,
            error: None,
        })
    }
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for PatternAnalyzer {
    type Report = PatternReport;

    fn kind(&self) -> AnalysisKind {
        AnalysisKind::PatternAnalysis
    }

    fn name(&self) -> &'static str {
        "Pattern Analyzer"
    }

    fn analyze(&self, records: &[ExpenseRecord]) -> PatternReport {
        settle(self.kind(), self.analyze_patterns(records))
    }
}

impl Outcome for PatternReport {
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

/// Percentage change from the first to the last daily total
fn spending_trend(daily: &BTreeMap<NaiveDate, f64>) -> Option<SpendingTrend> {
    if daily.len() < 2 {
        return None;
    }
    let first = *daily.values().next()?;
    let last = *daily.values().next_back()?;

    let change = if first > 0.0 {
        safe_float((last - first) / first * 100.0)
    } else {
        0.0
    };

    Some(SpendingTrend {
        direction: TrendDirection::from_change(change),
        percentage_change: change,
    })
}

/// Coefficient of variation; 0 when it is undefined
fn volatility(amounts: &[f64]) -> f64 {
    match (mean(amounts), sample_std(amounts)) {
        (Some(m), Some(std)) if m > 0.0 => safe_float(std / m),
        _ => 0.0,
    }
}

fn top_categories(by_category: &BTreeMap<&str, Vec<f64>>) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = by_category
        .iter()
        .map(|(category, amounts)| CategoryTotal {
            category: category.to_string(),
            total: safe_float(amounts.iter().sum()),
        })
        .collect();

    // Name order from the map survives the stable sort on ties
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    totals.truncate(TOP_CATEGORIES);
    totals
}

/// Highest daily total, earliest date on ties
fn peak_day(daily: &BTreeMap<NaiveDate, f64>) -> Option<PeakDay> {
    let mut peak: Option<PeakDay> = None;
    for (date, amount) in daily {
        if peak.as_ref().map_or(true, |p| *amount > p.amount) {
            peak = Some(PeakDay {
                date: *date,
                amount: safe_float(*amount),
            });
        }
    }
    peak
}
