//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;
use std::path::PathBuf;

use finsight_core::AnalysisParams;
use tempfile::{NamedTempFile, TempDir};

use crate::commands::{self, truncate};

const SAMPLE_CSV: &str = "\
category,amount,date,description
groceries,20,2024-01-01,Market
groceries,20,2024-01-02,Market
groceries,20,2024-01-03,Market
groceries,20,2024-01-04,Market
groceries,500,2024-01-05,Catering
transport,12.50,2024-01-05,Bus
";

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn sample_records() -> Vec<finsight_core::ExpenseRecord> {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "expenses.csv", SAMPLE_CSV);
    commands::load_input(Some(path.as_path())).unwrap()
}

// ========== Input Tests ==========

#[test]
fn test_load_input_csv() {
    let records = sample_records();
    assert_eq!(records.len(), 6);
    assert_eq!(records[4].description.as_deref(), Some("Catering"));
}

#[test]
fn test_load_input_json() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "expenses.json",
        r#"{"expenses": [{"category": "food", "amount": "12.5", "date": "2024-01-01"}]}"#,
    );
    let records = commands::load_input(Some(path.as_path())).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].category.as_deref(), Some("food"));
}

#[test]
fn test_load_input_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "expenses.txt", "nothing");
    let err = commands::load_input(Some(path.as_path())).unwrap_err();
    assert!(err.to_string().contains("Failed to load records"));
}

// ========== Parameter Tests ==========

#[test]
fn test_load_params_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[budget]\npercentile = 90.0").unwrap();

    let params = commands::load_params(Some(file.path())).unwrap();
    assert_eq!(params.percentile, 90.0);
    assert_eq!(params.days_ahead, 30);
}

#[test]
fn test_load_params_missing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(commands::load_params(Some(missing.as_path())).is_err());
}

// ========== Command Tests ==========

#[test]
fn test_cmd_anomalies() {
    let records = sample_records();
    let params = AnalysisParams::default();
    assert!(commands::cmd_anomalies(&records, &params, false).is_ok());
    assert!(commands::cmd_anomalies(&records, &params, true).is_ok());
}

#[test]
fn test_cmd_rejects_invalid_params() {
    let records = sample_records();
    let params = AnalysisParams {
        contamination: 0.0,
        ..Default::default()
    };
    let err = commands::cmd_anomalies(&records, &params, false).unwrap_err();
    assert!(err.to_string().contains("Invalid analysis parameters"));

    let params = AnalysisParams {
        days_ahead: 1000,
        ..Default::default()
    };
    assert!(commands::cmd_forecast(&records, &params, true).is_err());
}

#[test]
fn test_cmd_forecast_aggregate() {
    let records = sample_records();
    let params = AnalysisParams {
        days_ahead: 7,
        by_category: false,
        ..Default::default()
    };
    assert!(commands::cmd_forecast(&records, &params, false).is_ok());
}

#[test]
fn test_cmd_budget_and_patterns() {
    let records = sample_records();
    let params = AnalysisParams::default();
    assert!(commands::cmd_budget(&records, &params, false).is_ok());
    assert!(commands::cmd_patterns(&records, &params, false).is_ok());
}

#[test]
fn test_cmd_all_with_little_data() {
    let all = sample_records();
    let records = &all[..2];
    let params = AnalysisParams::default();
    assert!(commands::cmd_all(records, &params, false).is_ok());
    assert!(commands::cmd_all(records, &params, true).is_ok());
}

#[test]
fn test_cmd_models() {
    assert!(commands::cmd_models(false).is_ok());
    assert!(commands::cmd_models(true).is_ok());
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a very long description", 10), "a very ...");
    assert_eq!(truncate("café crème brûlée", 8), "café ...");
}
