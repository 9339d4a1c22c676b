//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Finsight - Expense analytics for categorized spending
#[derive(Parser)]
#[command(name = "finsight")]
#[command(about = "Anomalies, forecasts, budgets and spending patterns", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Expense records (.json or .csv); JSON is read from stdin when omitted
    #[arg(short, long, global = true)]
    pub input: Option<PathBuf>,

    /// Analysis parameter file (TOML)
    ///
    /// Defaults to ~/.local/share/finsight/config/analytics.toml when it
    /// exists, otherwise the built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Flag unusual transactions
    Anomalies {
        /// Expected proportion of anomalies, in (0, 1]
        #[arg(short, long)]
        contamination: Option<f64>,
    },

    /// Forecast daily spending
    Forecast {
        /// Number of days to forecast
        #[arg(short, long)]
        days_ahead: Option<usize>,

        /// Forecast the daily total instead of each category
        #[arg(long)]
        aggregate: bool,
    },

    /// Recommend per-category budgets
    Budget {
        /// Percentile of past transactions used as the budget, in [0, 100]
        #[arg(short, long)]
        percentile: Option<f64>,
    },

    /// Show trend, volatility, top categories and peak day
    Patterns,

    /// Run every analysis
    All,

    /// List the available analyses
    Models,
}
