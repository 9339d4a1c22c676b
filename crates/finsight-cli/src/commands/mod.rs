//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Analysis commands (anomalies, forecast, budget, patterns, all)
//! - `models` - Listing of the available analyses
//!
//! Shared helpers for loading records and parameters live here.

pub mod analyze;
pub mod models;

// Re-export command functions for main.rs
pub use analyze::*;
pub use models::*;

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use finsight_core::{load_records, parse_json_records, AnalysisParams, ExpenseRecord};
use serde::Serialize;
use tracing::debug;

/// Load records from a file, or JSON from stdin when no file is given
pub fn load_input(input: Option<&Path>) -> Result<Vec<ExpenseRecord>> {
    let records = match input {
        Some(path) => load_records(path)
            .with_context(|| format!("Failed to load records from {}", path.display()))?,
        None => {
            debug!("Reading JSON records from stdin");
            parse_json_records(io::stdin().lock()).context("Failed to read records from stdin")?
        }
    };
    Ok(records)
}

/// Load analysis parameters from an explicit file or the default locations
pub fn load_params(config: Option<&Path>) -> Result<AnalysisParams> {
    let params = match config {
        Some(path) => AnalysisParams::from_path(path)?,
        None => AnalysisParams::load()?,
    };
    Ok(params)
}

/// Pretty-print any result as JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
