//! Shared numeric helpers and the category aggregator

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::NormalizedExpense;

/// Map NaN and infinities to 0.0 so no non-finite value leaves the core
pub fn safe_float(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1), `None` with fewer than two values
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Percentile with linear interpolation between closest ranks
///
/// `pct = 0` yields the minimum and `pct = 100` the maximum.
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() || !pct.is_finite() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Aggregate statistics for one category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStats {
    pub mean: f64,
    /// Sample std; 1.0 when undefined (single transaction)
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
    pub total: f64,
}

impl CategoryStats {
    fn from_amounts(amounts: &[f64]) -> Self {
        let total: f64 = amounts.iter().sum();
        Self {
            mean: mean(amounts).unwrap_or(0.0),
            std: sample_std(amounts).unwrap_or(1.0),
            min: amounts.iter().copied().fold(f64::INFINITY, f64::min),
            max: amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            count: amounts.len(),
            total,
        }
    }
}

/// Group amounts by category label, failing on a malformed label
pub fn amounts_by_category(records: &[NormalizedExpense]) -> Result<BTreeMap<String, Vec<f64>>> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.category()?.to_string())
            .or_default()
            .push(record.amount);
    }
    Ok(groups)
}

/// Per-category mean/std/min/max/count lookup
pub fn category_stats(records: &[NormalizedExpense]) -> Result<BTreeMap<String, CategoryStats>> {
    Ok(amounts_by_category(records)?
        .into_iter()
        .map(|(category, amounts)| (category, CategoryStats::from_amounts(&amounts)))
        .collect())
}

/// Sum same-day amounts into a chronologically ordered daily series
pub fn daily_totals<'a, I>(records: I) -> BTreeMap<NaiveDate, f64>
where
    I: IntoIterator<Item = (NaiveDate, &'a NormalizedExpense)>,
{
    let mut totals = BTreeMap::new();
    for (date, record) in records {
        *totals.entry(date).or_insert(0.0) += record.amount;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::normalized;

    #[test]
    fn test_safe_float() {
        assert_eq!(safe_float(1.5), 1.5);
        assert_eq!(safe_float(f64::NAN), 0.0);
        assert_eq!(safe_float(f64::INFINITY), 0.0);
        assert_eq!(safe_float(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_mean_and_std() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
        assert_eq!(sample_std(&[5.0]), None);
        assert_eq!(sample_std(&[3.0, 3.0, 3.0]), Some(0.0));

        let std = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((std - 2.138_089_935).abs() < 1e-6);
    }

    #[test]
    fn test_percentile() {
        let values = [40.0, 10.0, 30.0, 20.0];
        assert_eq!(percentile(&values, 0.0), Some(10.0));
        assert_eq!(percentile(&values, 100.0), Some(40.0));
        assert_eq!(percentile(&values, 50.0), Some(25.0));
        assert_eq!(percentile(&values, 75.0), Some(32.5));
        assert_eq!(percentile(&[100.0], 75.0), Some(100.0));
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_category_stats() {
        let records = normalized(&[
            ("food", 10.0, "2024-01-01"),
            ("food", 30.0, "2024-01-02"),
            ("rent", 900.0, "2024-01-01"),
        ]);

        let stats = category_stats(&records).unwrap();
        let food = &stats["food"];
        assert_eq!(food.mean, 20.0);
        assert_eq!(food.min, 10.0);
        assert_eq!(food.max, 30.0);
        assert_eq!(food.count, 2);
        assert_eq!(food.total, 40.0);
        assert!((food.std - 14.142_135_6).abs() < 1e-6);

        // single transaction: std defaults to 1.0
        assert_eq!(stats["rent"].std, 1.0);
    }

    #[test]
    fn test_category_stats_rejects_missing_label() {
        let mut records = normalized(&[("food", 10.0, "2024-01-01")]);
        records[0].category = None;
        assert!(category_stats(&records).is_err());
    }

    #[test]
    fn test_daily_totals() {
        let records = normalized(&[
            ("food", 10.0, "2024-01-02"),
            ("rent", 5.0, "2024-01-01"),
            ("food", 2.5, "2024-01-02"),
        ]);
        let totals = daily_totals(records.iter().map(|r| (r.date.unwrap(), r)));
        let values: Vec<f64> = totals.values().copied().collect();
        assert_eq!(values, vec![5.0, 12.5]);
    }
}
