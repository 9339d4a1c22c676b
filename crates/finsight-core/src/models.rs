//! Expense record types
//!
//! [`ExpenseRecord`] is the normalized record supplied by an upstream
//! parser or store. Its amount may still be a numeric string; the
//! normalizer turns it into a [`NormalizedExpense`] or drops it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// An expense record as received at the input boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    #[serde(default)]
    pub category: Option<String>,
    /// Number or numeric string
    #[serde(default)]
    pub amount: Value,
    /// ISO-8601 date
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub merchant: Option<String>,
}

impl ExpenseRecord {
    pub fn new(category: &str, amount: f64, date: &str) -> Self {
        Self {
            category: Some(category.to_string()),
            amount: Value::from(amount),
            date: Some(date.to_string()),
            description: None,
            merchant: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// A record whose amount coerced to a finite number
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedExpense {
    pub category: Option<String>,
    pub amount: f64,
    /// Parsed calendar date, if the raw date was understood
    pub date: Option<NaiveDate>,
    /// Date exactly as supplied
    pub raw_date: String,
    pub description: Option<String>,
    pub merchant: Option<String>,
}

impl NormalizedExpense {
    /// Category label, failing on a missing or blank label
    pub fn category(&self) -> Result<&str> {
        match self.category.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => Ok(label),
            _ => Err(Error::InvalidData(format!(
                "record dated '{}' with amount {} has no category",
                self.raw_date, self.amount
            ))),
        }
    }
}
