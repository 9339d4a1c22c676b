//! Record normalization
//!
//! Coerces raw amounts to finite numbers and drops rows that cannot be
//! coerced. Statistical analyses need at least [`MIN_RECORDS`] usable rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ExpenseRecord, NormalizedExpense};

/// Minimum usable records for any statistical analysis
pub const MIN_RECORDS: usize = 5;

/// Message reported when fewer than [`MIN_RECORDS`] records are usable
pub const INSUFFICIENT_DATA_MESSAGE: &str = "insufficient data";

/// Coerce a raw amount into a finite number
///
/// Accepts JSON numbers and strings that parse as a float once trimmed.
pub fn coerce_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    amount.is_finite().then_some(amount)
}

/// Parse an ISO date or timestamp into its calendar date
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    let formats = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// Keep only records with a finite amount
pub fn normalize(records: &[ExpenseRecord]) -> Vec<NormalizedExpense> {
    let normalized: Vec<NormalizedExpense> = records
        .iter()
        .filter_map(|record| {
            let amount = coerce_amount(&record.amount)?;
            let raw_date = record.date.clone().unwrap_or_default();
            Some(NormalizedExpense {
                category: record.category.clone(),
                amount,
                date: parse_date(&raw_date),
                raw_date,
                description: record.description.clone(),
                merchant: record.merchant.clone(),
            })
        })
        .collect();

    if normalized.len() < records.len() {
        debug!(
            dropped = records.len() - normalized.len(),
            kept = normalized.len(),
            "Dropped records with unparsable amounts"
        );
    }

    normalized
}

/// Records that also carry a parseable date
pub fn dated(records: &[NormalizedExpense]) -> Vec<(NaiveDate, &NormalizedExpense)> {
    records
        .iter()
        .filter_map(|r| r.date.map(|d| (d, r)))
        .collect()
}

/// Fail with [`Error::InsufficientData`] below [`MIN_RECORDS`]
pub fn require_minimum(count: usize) -> Result<()> {
    if count < MIN_RECORDS {
        return Err(Error::InsufficientData(format!(
            "{} usable records, at least {} required",
            count, MIN_RECORDS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_amount() {
        assert_eq!(coerce_amount(&json!(12.5)), Some(12.5));
        assert_eq!(coerce_amount(&json!(-3)), Some(-3.0));
        assert_eq!(coerce_amount(&json!(" 42.10 ")), Some(42.10));
        assert_eq!(coerce_amount(&json!("abc")), None);
        assert_eq!(coerce_amount(&json!("inf")), None);
        assert_eq!(coerce_amount(&json!("NaN")), None);
        assert_eq!(coerce_amount(&json!(null)), None);
        assert_eq!(coerce_amount(&json!(true)), None);
    }

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(parse_date("2024-03-09"), Some(expected));
        assert_eq!(parse_date("2024-03-09T14:30:00"), Some(expected));
        assert_eq!(parse_date("2024-03-09T14:30:00Z"), Some(expected));
        assert_eq!(parse_date("2024-03-09 08:00:00"), Some(expected));
        assert_eq!(parse_date("March 9th"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_normalize_drops_bad_amounts() {
        let mut bad = ExpenseRecord::new("food", 0.0, "2024-01-02");
        bad.amount = json!("twelve");

        let records = vec![
            ExpenseRecord::new("food", 10.0, "2024-01-01"),
            bad,
            ExpenseRecord::new("food", 30.0, "not a date"),
        ];

        let normalized = normalize(&records);
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0].amount, 10.0);
        assert!(normalized[1].date.is_none());
        assert_eq!(normalized[1].raw_date, "not a date");

        // input untouched
        assert_eq!(records.len(), 3);
        assert_eq!(dated(&normalized).len(), 1);
    }

    #[test]
    fn test_require_minimum() {
        assert!(require_minimum(5).is_ok());
        assert!(matches!(
            require_minimum(4),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn test_missing_category_is_malformed() {
        let mut record = ExpenseRecord::new("  ", 5.0, "2024-01-01");
        let normalized = normalize(std::slice::from_ref(&record));
        assert!(normalized[0].category().is_err());

        record.category = None;
        let normalized = normalize(&[record]);
        assert!(normalized[0].category().is_err());
    }
}
