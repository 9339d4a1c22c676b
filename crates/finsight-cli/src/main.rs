//! Finsight CLI - Expense analytics
//!
//! Usage:
//!   finsight --input expenses.csv anomalies      Flag unusual transactions
//!   finsight --input expenses.json forecast      Forecast daily spending
//!   finsight --input expenses.csv budget         Recommend budgets
//!   finsight --input expenses.csv all --json     Full report as JSON

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    if let Commands::Models = cli.command {
        return commands::cmd_models(cli.json);
    }

    let mut params = commands::load_params(cli.config.as_deref())?;
    let records = commands::load_input(cli.input.as_deref())?;

    match cli.command {
        Commands::Anomalies { contamination } => {
            if let Some(contamination) = contamination {
                params.contamination = contamination;
            }
            commands::cmd_anomalies(&records, &params, cli.json)
        }
        Commands::Forecast {
            days_ahead,
            aggregate,
        } => {
            if let Some(days_ahead) = days_ahead {
                params.days_ahead = days_ahead;
            }
            if aggregate {
                params.by_category = false;
            }
            commands::cmd_forecast(&records, &params, cli.json)
        }
        Commands::Budget { percentile } => {
            if let Some(percentile) = percentile {
                params.percentile = percentile;
            }
            commands::cmd_budget(&records, &params, cli.json)
        }
        Commands::Patterns => commands::cmd_patterns(&records, &params, cli.json),
        Commands::All => commands::cmd_all(&records, &params, cli.json),
        Commands::Models => commands::cmd_models(cli.json),
    }
}
