//! Loading normalized expense records from files
//!
//! Supported inputs:
//! - JSON: an array of records, or an object with an `expenses` array
//! - CSV: `category,amount,date` plus optional `description,merchant`
//!
//! Column-name guessing for arbitrary spreadsheets is not done here; the
//! files are expected to already use the normalized field names.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::ExpenseRecord;

/// Record file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Json,
    Csv,
}

impl RecordFormat {
    /// Pick a format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("csv") => Ok(Self::Csv),
            _ => Err(Error::InvalidData(format!(
                "Unsupported record file: {} (expected .json or .csv)",
                path.display()
            ))),
        }
    }
}

/// Load records from a `.json` or `.csv` file
pub fn load_records(path: &Path) -> Result<Vec<ExpenseRecord>> {
    let format = RecordFormat::from_path(path)?;
    let file = File::open(path)?;
    let records = match format {
        RecordFormat::Json => parse_json_records(file)?,
        RecordFormat::Csv => parse_csv_records(file)?,
    };
    debug!(path = %path.display(), count = records.len(), "Loaded expense records");
    Ok(records)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonInput {
    List(Vec<ExpenseRecord>),
    Wrapped { expenses: Vec<ExpenseRecord> },
}

/// Parse a JSON array of records or an `{"expenses": [...]}` object
pub fn parse_json_records<R: Read>(reader: R) -> Result<Vec<ExpenseRecord>> {
    let input: JsonInput = serde_json::from_reader(reader)?;
    Ok(match input {
        JsonInput::List(records) => records,
        JsonInput::Wrapped { expenses } => expenses,
    })
}

#[derive(Deserialize)]
struct CsvRow {
    category: Option<String>,
    amount: Option<String>,
    date: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    merchant: Option<String>,
}

/// Parse normalized CSV rows; amounts stay strings until normalization
pub fn parse_csv_records<R: Read>(reader: R) -> Result<Vec<ExpenseRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for required in ["category", "amount", "date"] {
        if !headers.iter().any(|h| h == required) {
            return Err(Error::InvalidData(format!(
                "CSV header is missing the '{}' column",
                required
            )));
        }
    }

    let mut records = Vec::new();
    for result in rdr.deserialize::<CsvRow>() {
        let row = result?;
        records.push(ExpenseRecord {
            category: row.category.filter(|s| !s.is_empty()),
            amount: row.amount.map(Value::String).unwrap_or(Value::Null),
            date: row.date.filter(|s| !s.is_empty()),
            description: row.description.filter(|s| !s.is_empty()),
            merchant: row.merchant.filter(|s| !s.is_empty()),
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_json_array() {
        let json = r#"[
            {"category": "food", "amount": 12.5, "date": "2024-01-01", "description": "Lunch"},
            {"category": "rent", "amount": "1000", "date": "2024-01-02"}
        ]"#;

        let records = parse_json_records(json.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category.as_deref(), Some("food"));
        assert_eq!(records[0].description.as_deref(), Some("Lunch"));
        assert_eq!(records[1].amount, Value::String("1000".into()));
        assert!(records[1].merchant.is_none());
    }

    #[test]
    fn test_parse_json_wrapped() {
        let json = r#"{"expenses": [{"category": "food", "amount": 3, "date": "2024-01-01"}]}"#;
        let records = parse_json_records(json.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_json_invalid() {
        assert!(parse_json_records("{\"nope\": 1}".as_bytes()).is_err());
    }

    #[test]
    fn test_parse_csv() {
        let csv = "category,amount,date,description,merchant
food, 12.50 ,2024-01-01,Lunch,Cafe
rent,abc,2024-01-02,,
transport,7,2024-01-03";

        let records = parse_csv_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].amount, Value::String("12.50".into()));
        assert_eq!(records[0].merchant.as_deref(), Some("Cafe"));
        assert!(records[1].description.is_none());
        assert_eq!(records[2].category.as_deref(), Some("transport"));
    }

    #[test]
    fn test_parse_csv_missing_column() {
        let csv = "category,date\nfood,2024-01-01";
        let err = parse_csv_records(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_load_records_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "category,amount,date\nfood,1,2024-01-01").unwrap();

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 1);

        let bad = dir.path().join("records.xlsx");
        File::create(&bad).unwrap();
        assert!(load_records(&bad).is_err());
    }
}
