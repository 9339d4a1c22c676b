//! Record builders shared by unit tests

use chrono::{Duration, NaiveDate};

use crate::analytics::normalize::normalize;
use crate::models::{ExpenseRecord, NormalizedExpense};

/// Build records from `(category, amount, date)` rows
pub fn records(rows: &[(&str, f64, &str)]) -> Vec<ExpenseRecord> {
    rows.iter()
        .map(|(category, amount, date)| ExpenseRecord::new(category, *amount, date))
        .collect()
}

/// Same as [`records`], already normalized
pub fn normalized(rows: &[(&str, f64, &str)]) -> Vec<NormalizedExpense> {
    normalize(&records(rows))
}

/// One record per consecutive day starting at `start`
pub fn daily_records(category: &str, start: &str, amounts: &[f64]) -> Vec<ExpenseRecord> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").expect("valid start date");
    amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| {
            let date = start + Duration::days(i as i64);
            ExpenseRecord::new(category, *amount, &date.format("%Y-%m-%d").to_string())
        })
        .collect()
}
