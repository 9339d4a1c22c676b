//! Analysis parameters and their configuration files
//!
//! Parameters are resolved in layers:
//! 1. Explicit override path (e.g. `--config`)
//! 2. Override in data dir (~/.local/share/finsight/config/analytics.toml)
//! 3. Embedded defaults (compiled into binary)
//!
//! Callers may then override individual values (CLI flags) before calling
//! [`AnalysisParams::validate`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analytics.toml");

/// Longest forecast horizon accepted, in days
pub const MAX_DAYS_AHEAD: usize = 365;

/// Per-call analysis parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    /// Expected anomaly proportion, in (0, 1]
    pub contamination: f64,
    /// Forecast horizon in days
    pub days_ahead: usize,
    /// Forecast per category instead of the aggregate daily total
    pub by_category: bool,
    /// Percentile used for budget ceilings, in [0, 100]
    pub percentile: f64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            contamination: 0.1,
            days_ahead: 30,
            by_category: true,
            percentile: 75.0,
        }
    }
}

impl AnalysisParams {
    /// Load parameters using the default resolution order
    pub fn load() -> Result<Self> {
        load_params(None)
    }

    /// Load parameters from an explicit override file
    pub fn from_path(path: &Path) -> Result<Self> {
        load_params(Some(path))
    }

    /// Parse parameters from TOML content, layered over the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_params(content)
    }

    /// Check every parameter against its accepted range
    pub fn validate(&self) -> Result<()> {
        validate_contamination(self.contamination)?;
        validate_days_ahead(self.days_ahead)?;
        validate_percentile(self.percentile)?;
        Ok(())
    }
}

pub(crate) fn validate_contamination(contamination: f64) -> Result<()> {
    if !contamination.is_finite() || contamination <= 0.0 || contamination > 1.0 {
        return Err(Error::InvalidParameter(format!(
            "contamination must be in (0, 1], got {}",
            contamination
        )));
    }
    Ok(())
}

pub(crate) fn validate_days_ahead(days_ahead: usize) -> Result<()> {
    if days_ahead == 0 || days_ahead > MAX_DAYS_AHEAD {
        return Err(Error::InvalidParameter(format!(
            "days_ahead must be between 1 and {}, got {}",
            MAX_DAYS_AHEAD, days_ahead
        )));
    }
    Ok(())
}

pub(crate) fn validate_percentile(percentile: f64) -> Result<()> {
    if !percentile.is_finite() || !(0.0..=100.0).contains(&percentile) {
        return Err(Error::InvalidParameter(format!(
            "percentile must be in [0, 100], got {}",
            percentile
        )));
    }
    Ok(())
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finsight").join("config").join("analytics.toml"))
}

/// Load parameters (override first, then data dir, then embedded default)
fn load_params(override_path: Option<&Path>) -> Result<AnalysisParams> {
    let content = match override_path {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?,
        None => match default_config_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "Using config override");
                fs::read_to_string(&path)
                    .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
            }
            _ => DEFAULT_CONFIG.to_string(),
        },
    };

    parse_params(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    anomalies: Option<RawAnomalies>,
    forecast: Option<RawForecast>,
    budget: Option<RawBudget>,
}

#[derive(Debug, Deserialize)]
struct RawAnomalies {
    contamination: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    days_ahead: Option<usize>,
    by_category: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawBudget {
    percentile: Option<f64>,
}

fn parse_params(content: &str) -> Result<AnalysisParams> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut params = AnalysisParams::default();

    if let Some(contamination) = raw.anomalies.and_then(|a| a.contamination) {
        params.contamination = contamination;
    }
    if let Some(forecast) = raw.forecast {
        if let Some(days) = forecast.days_ahead {
            params.days_ahead = days;
        }
        if let Some(by_category) = forecast.by_category {
            params.by_category = by_category;
        }
    }
    if let Some(percentile) = raw.budget.and_then(|b| b.percentile) {
        params.percentile = percentile;
    }

    params.validate()?;
    Ok(params)
}
