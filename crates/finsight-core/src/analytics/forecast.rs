//! Forecaster
//!
//! Predicts daily spending per category (or for the daily total) over a
//! fixed horizon. Series with at least five days of history get the
//! seasonal model; shorter series, or fits that fail, fall back to a flat
//! projection of the series mean with a one-std band.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::config::validate_days_ahead;
use crate::error::Result;
use crate::models::ExpenseRecord;

use super::engine::{settle, Analyzer, Outcome};
use super::normalize::{dated, normalize, require_minimum};
use super::seasonal::{horizon_date, SeasonalModel, MIN_FIT_POINTS};
use super::stats::{daily_totals, mean, safe_float, sample_std};
use super::types::{AnalysisKind, ForecastMethod, ForecastPoint, ForecastReport};

/// Key of the aggregate series
pub const TOTAL_SERIES: &str = "total";

/// Category series shorter than this are left out
const MIN_SERIES_POINTS: usize = 2;

/// Forecasts daily expenses
pub struct Forecaster {
    /// Number of days to forecast (default 30)
    days_ahead: usize,
    /// One series per category instead of the daily total (default true)
    by_category: bool,
}

impl Forecaster {
    pub fn new() -> Self {
        Self {
            days_ahead: 30,
            by_category: true,
        }
    }

    pub fn with_horizon(days_ahead: usize, by_category: bool) -> Self {
        Self {
            days_ahead,
            by_category,
        }
    }

    /// Forecast with an explicit generation timestamp
    pub fn forecast_at(&self, records: &[ExpenseRecord], now: DateTime<Utc>) -> ForecastReport {
        settle(self.kind(), self.forecast(records, now))
    }

    fn forecast(&self, records: &[ExpenseRecord], now: DateTime<Utc>) -> Result<ForecastReport> {
        validate_days_ahead(self.days_ahead)?;

        let valid = normalize(records);
        let dated = dated(&valid);
        require_minimum(dated.len())?;

        let mut predictions = BTreeMap::new();
        let mut methods = BTreeMap::new();

        if self.by_category {
            let mut by_category: BTreeMap<&str, Vec<_>> = BTreeMap::new();
            for (date, record) in &dated {
                match record.category() {
                    Ok(category) => by_category
                        .entry(category)
                        .or_default()
                        .push((*date, *record)),
                    Err(e) => debug!(error = %e, "Skipping record without a category"),
                }
            }

            for (category, rows) in by_category {
                let series = daily_totals(rows);
                if series.len() < MIN_SERIES_POINTS {
                    debug!(category, points = series.len(), "Skipping short series");
                    continue;
                }
                match project(&series, self.days_ahead) {
                    Ok((method, points)) => {
                        methods.insert(category.to_string(), method);
                        predictions.insert(category.to_string(), points);
                    }
                    Err(e) => debug!(category, error = %e, "Skipping series"),
                }
            }
        } else {
            let series = daily_totals(dated);
            let (method, points) = project(&series, self.days_ahead)?;
            methods.insert(TOTAL_SERIES.to_string(), method);
            predictions.insert(TOTAL_SERIES.to_string(), points);
        }

        let total_prediction_points = predictions.values().map(Vec::len).sum();
        Ok(ForecastReport {
            predictions,
            methods,
            prediction_period_days: self.days_ahead,
            total_prediction_points,
            generated_at: Some(now),
            message: None,
            error: None,
        })
    }
}

impl Default for Forecaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for Forecaster {
    type Report = ForecastReport;

    fn kind(&self) -> AnalysisKind {
        AnalysisKind::ExpensePrediction
    }

    fn name(&self) -> &'static str {
        "Expense Forecaster"
    }

    fn analyze(&self, records: &[ExpenseRecord]) -> ForecastReport {
        self.forecast_at(records, Utc::now())
    }
}

impl Outcome for ForecastReport {
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

/// Forecast one non-empty daily series, falling back when the model cannot fit
///
/// Fails only when the horizon runs past the last representable date.
fn project(
    series: &BTreeMap<NaiveDate, f64>,
    days_ahead: usize,
) -> Result<(ForecastMethod, Vec<ForecastPoint>)> {
    let points: Vec<(NaiveDate, f64)> = series.iter().map(|(d, v)| (*d, *v)).collect();

    if points.len() >= MIN_FIT_POINTS {
        let fitted = SeasonalModel::fit(&points).and_then(|model| {
            debug!(
                points = points.len(),
                weekly = model.has_weekly_seasonality(),
                "Fitted seasonal model"
            );
            model.predict(days_ahead)
        });
        match fitted {
            Ok(predictions) => {
                let forecast = predictions
                    .into_iter()
                    .map(|p| floored_point(p.date, p.yhat, p.lower, p.upper))
                    .collect();
                return Ok((ForecastMethod::Seasonal, forecast));
            }
            Err(e) => {
                debug!(error = %e, points = points.len(), "Seasonal fit failed, using average");
            }
        }
    }

    Ok((ForecastMethod::MovingAverage, fallback(&points, days_ahead)?))
}

/// Flat mean ± std projection from the day after the last observation
fn fallback(points: &[(NaiveDate, f64)], days_ahead: usize) -> Result<Vec<ForecastPoint>> {
    let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
    let avg = mean(&values).unwrap_or(0.0);
    let std = sample_std(&values).unwrap_or(0.0);
    let Some(&(last, _)) = points.last() else {
        return Ok(Vec::new());
    };

    (1..=days_ahead as i64)
        .map(|h| {
            let date = horizon_date(last, h)?;
            Ok(floored_point(date, avg, avg - std, avg + std))
        })
        .collect()
}

/// Negative spending is meaningless, so every field is floored at zero
fn floored_point(date: NaiveDate, predicted: f64, lower: f64, upper: f64) -> ForecastPoint {
    ForecastPoint {
        date,
        predicted_amount: safe_float(predicted).max(0.0),
        lower_bound: safe_float(lower).max(0.0),
        upper_bound: safe_float(upper).max(0.0),
    }
}
