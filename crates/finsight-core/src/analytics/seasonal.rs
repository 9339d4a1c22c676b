//! Additive trend + weekly seasonality model
//!
//! Fits an ordinary-least-squares line over the day offset and, when the
//! history spans more than two weeks, an additive day-of-week component
//! estimated from the detrended residuals. Prediction intervals use the
//! residual standard error with the OLS prediction variance term.

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{Error, Result};

/// Fewest daily points a fit is attempted on
pub const MIN_FIT_POINTS: usize = 5;

/// Weekly seasonality needs more than this many days of history
const WEEKLY_MIN_SPAN_DAYS: i64 = 14;

/// Two-sided z value for an 80% prediction interval
const Z_80: f64 = 1.281_551_565_545;

/// One predicted day
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub date: NaiveDate,
    pub yhat: f64,
    pub lower: f64,
    pub upper: f64,
}

/// A fitted model over one daily series
#[derive(Debug, Clone)]
pub struct SeasonalModel {
    start: NaiveDate,
    last: NaiveDate,
    intercept: f64,
    slope: f64,
    /// Day-of-week offsets, Monday first
    weekly: Option<[f64; 7]>,
    n: usize,
    t_mean: f64,
    sxx: f64,
    residual_std: f64,
}

impl SeasonalModel {
    /// Fit a chronologically ordered daily series
    pub fn fit(series: &[(NaiveDate, f64)]) -> Result<Self> {
        let n = series.len();
        if n < MIN_FIT_POINTS {
            return Err(Error::ModelFit(format!(
                "{} points, at least {} required",
                n, MIN_FIT_POINTS
            )));
        }
        if series.iter().any(|(_, y)| !y.is_finite()) {
            return Err(Error::ModelFit("series has non-finite values".into()));
        }

        let start = series[0].0;
        let last = series[n - 1].0;
        let t: Vec<f64> = series
            .iter()
            .map(|(d, _)| (*d - start).num_days() as f64)
            .collect();
        let y: Vec<f64> = series.iter().map(|(_, v)| *v).collect();

        let nf = n as f64;
        let t_mean = t.iter().sum::<f64>() / nf;
        let y_mean = y.iter().sum::<f64>() / nf;

        let syy: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
        if syy <= f64::EPSILON * y_mean.abs().max(1.0) {
            return Err(Error::ModelFit("series has zero variance".into()));
        }

        let sxx: f64 = t.iter().map(|ti| (ti - t_mean).powi(2)).sum();
        if sxx <= 0.0 {
            return Err(Error::ModelFit("series spans a single day".into()));
        }
        let sxy: f64 = t
            .iter()
            .zip(&y)
            .map(|(ti, yi)| (ti - t_mean) * (yi - y_mean))
            .sum();

        let slope = sxy / sxx;
        let intercept = y_mean - slope * t_mean;

        let mut residuals: Vec<f64> = t
            .iter()
            .zip(&y)
            .map(|(ti, yi)| yi - (intercept + slope * ti))
            .collect();

        let span = (last - start).num_days();
        let mut params = 2;
        let weekly = if span > WEEKLY_MIN_SPAN_DAYS {
            let (offsets, observed) = weekday_offsets(series, &residuals);
            for ((date, _), r) in series.iter().zip(residuals.iter_mut()) {
                *r -= offsets[weekday_index(*date)];
            }
            params += observed.saturating_sub(1);
            Some(offsets)
        } else {
            None
        };

        if n <= params {
            return Err(Error::ModelFit(format!(
                "{} points cannot support {} parameters",
                n, params
            )));
        }
        let dof = (n - params) as f64;
        let residual_std = (residuals.iter().map(|r| r * r).sum::<f64>() / dof).sqrt();

        let model = Self {
            start,
            last,
            intercept,
            slope,
            weekly,
            n,
            t_mean,
            sxx,
            residual_std,
        };

        if !(model.intercept.is_finite() && model.slope.is_finite() && residual_std.is_finite())
        {
            return Err(Error::ModelFit("fit produced non-finite parameters".into()));
        }

        Ok(model)
    }

    pub fn has_weekly_seasonality(&self) -> bool {
        self.weekly.is_some()
    }

    /// Predict the `days_ahead` days following the last observation
    pub fn predict(&self, days_ahead: usize) -> Result<Vec<Prediction>> {
        (1..=days_ahead as i64)
            .map(|h| {
                let date = horizon_date(self.last, h)?;
                let t = (date - self.start).num_days() as f64;
                let seasonal = self
                    .weekly
                    .map(|offsets| offsets[weekday_index(date)])
                    .unwrap_or(0.0);
                let yhat = self.intercept + self.slope * t + seasonal;

                let spread = 1.0 + 1.0 / self.n as f64 + (t - self.t_mean).powi(2) / self.sxx;
                let margin = Z_80 * self.residual_std * spread.sqrt();

                if !(yhat.is_finite() && margin.is_finite()) {
                    return Err(Error::ModelFit(format!("non-finite prediction for {}", date)));
                }

                Ok(Prediction {
                    date,
                    yhat,
                    lower: yhat - margin,
                    upper: yhat + margin,
                })
            })
            .collect()
    }
}

/// The day `h` days after `last`, failing past the last representable date
pub(crate) fn horizon_date(last: NaiveDate, h: i64) -> Result<NaiveDate> {
    last.checked_add_signed(Duration::days(h)).ok_or_else(|| {
        Error::ModelFit(format!("forecast date {} days after {} is out of range", h, last))
    })
}

fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

/// Mean residual per weekday, centered over the observed weekdays
fn weekday_offsets(series: &[(NaiveDate, f64)], residuals: &[f64]) -> ([f64; 7], usize) {
    let mut sums = [0.0; 7];
    let mut counts = [0usize; 7];
    for ((date, _), r) in series.iter().zip(residuals) {
        let idx = weekday_index(*date);
        sums[idx] += r;
        counts[idx] += 1;
    }

    let mut offsets = [0.0; 7];
    let observed = counts.iter().filter(|&&c| c > 0).count();
    for i in 0..7 {
        if counts[i] > 0 {
            offsets[i] = sums[i] / counts[i] as f64;
        }
    }

    let center = offsets.iter().sum::<f64>() / observed.max(1) as f64;
    for i in 0..7 {
        if counts[i] > 0 {
            offsets[i] -= center;
        }
    }

    (offsets, observed)
}
