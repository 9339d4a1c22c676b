//! Analysis command implementations

use anyhow::{Context, Result};
use finsight_core::analytics::{
    AnomalyReport, BudgetReport, ForecastReport, FullReport, PatternReport, TrendDirection,
};
use finsight_core::{AnalysisParams, AnalyticsEngine, Analyzer, ExpenseRecord};

use super::{print_json, truncate};

fn engine_for(params: &AnalysisParams) -> Result<AnalyticsEngine> {
    params.validate().context("Invalid analysis parameters")?;
    Ok(AnalyticsEngine::new(params.clone()))
}

pub fn cmd_anomalies(records: &[ExpenseRecord], params: &AnalysisParams, json: bool) -> Result<()> {
    let report = engine_for(params)?.anomaly_detector().analyze(records);
    if json {
        return print_json(&report);
    }
    print_anomalies(&report);
    Ok(())
}

pub fn cmd_forecast(records: &[ExpenseRecord], params: &AnalysisParams, json: bool) -> Result<()> {
    let report = engine_for(params)?.forecaster().analyze(records);
    if json {
        return print_json(&report);
    }
    print_forecast(&report);
    Ok(())
}

pub fn cmd_budget(records: &[ExpenseRecord], params: &AnalysisParams, json: bool) -> Result<()> {
    let report = engine_for(params)?.budget_recommender().analyze(records);
    if json {
        return print_json(&report);
    }
    print_budget(&report);
    Ok(())
}

pub fn cmd_patterns(records: &[ExpenseRecord], params: &AnalysisParams, json: bool) -> Result<()> {
    let report = engine_for(params)?.pattern_analyzer().analyze(records);
    if json {
        return print_json(&report);
    }
    print_patterns(&report);
    Ok(())
}

pub fn cmd_all(records: &[ExpenseRecord], params: &AnalysisParams, json: bool) -> Result<()> {
    let report: FullReport = engine_for(params)?.analyze_all(records);
    if json {
        return print_json(&report);
    }
    print_anomalies(&report.anomalies);
    print_forecast(&report.forecast);
    print_budget(&report.budget);
    print_patterns(&report.patterns);
    Ok(())
}

/// Print the message/error line of a report that could not run.
/// Returns true when there is nothing else to show.
fn print_status(message: Option<&str>, error: Option<&str>) -> bool {
    if let Some(error) = error {
        println!("   ❌ Analysis failed: {}", error);
        return true;
    }
    if let Some(message) = message {
        println!("   ℹ️  {}", message);
        return true;
    }
    false
}

fn print_anomalies(report: &AnomalyReport) {
    println!();
    println!("🔍 Anomaly Detection");
    println!("   ─────────────────────────────────────────────────────────────");
    if print_status(report.message.as_deref(), report.error.as_deref()) {
        return;
    }

    println!(
        "   Transactions analyzed: {}  │  Anomalies: {} ({:.1}%)",
        report.total_transactions, report.anomaly_count, report.anomaly_percentage
    );

    if report.anomalies.is_empty() {
        println!();
        println!("✅ Nothing unusual found.");
        return;
    }

    println!();
    println!(
        "   {:10} │ {:15} │ {:>10} │ {:>8} │ {}",
        "Date", "Category", "Amount", "Severity", "Description"
    );
    println!("   ───────────┼─────────────────┼────────────┼──────────┼────────────────────");
    for anomaly in &report.anomalies {
        println!(
            "   {:10} │ {:15} │ {:>10.2} │ {:>8.2} │ {}",
            truncate(&anomaly.date, 10),
            truncate(&anomaly.category, 15),
            anomaly.amount,
            anomaly.severity,
            truncate(&anomaly.description, 30)
        );
        println!("   {:>49} \x1b[2m{}\x1b[0m", "", anomaly.reason);
    }
}

fn print_forecast(report: &ForecastReport) {
    println!();
    println!("📈 Expense Forecast");
    println!("   ─────────────────────────────────────────────────────────────");
    if print_status(report.message.as_deref(), report.error.as_deref()) {
        return;
    }

    println!(
        "   Horizon: {} days  │  Points: {}",
        report.prediction_period_days, report.total_prediction_points
    );
    if report.predictions.is_empty() {
        println!("   No series had enough history to forecast.");
        return;
    }

    for (series, points) in &report.predictions {
        let method = report
            .methods
            .get(series)
            .map(|m| m.as_str())
            .unwrap_or("unknown");
        let total: f64 = points.iter().map(|p| p.predicted_amount).sum();

        println!();
        println!("   {} ({}) - projected total ${:.2}", series, method, total);
        println!("   {:10} │ {:>10} │ {:>10} │ {:>10}", "Date", "Predicted", "Low", "High");
        println!("   ───────────┼────────────┼────────────┼────────────");
        for point in points {
            println!(
                "   {:10} │ {:>10.2} │ {:>10.2} │ {:>10.2}",
                point.date.format("%Y-%m-%d"),
                point.predicted_amount,
                point.lower_bound,
                point.upper_bound
            );
        }
    }
}

fn print_budget(report: &BudgetReport) {
    println!();
    println!("💰 Budget Recommendations");
    println!("   ─────────────────────────────────────────────────────────────");
    if print_status(report.message.as_deref(), report.error.as_deref()) {
        return;
    }

    println!(
        "   {:20} │ {:>10} │ {:>10} │ {:>10} │ {:>10} │ {:>5}",
        "Category", "Budget", "Average", "Min", "Max", "Count"
    );
    println!("   ─────────────────────┼────────────┼────────────┼────────────┼────────────┼───────");
    for (category, rec) in &report.recommendations {
        println!(
            "   {:20} │ {:>10.2} │ {:>10.2} │ {:>10.2} │ {:>10.2} │ {:>5}",
            truncate(category, 20),
            rec.recommended_budget,
            rec.average_spent,
            rec.min_spent,
            rec.max_spent,
            rec.total_transactions
        );
    }

    if let Some(summary) = &report.summary {
        println!();
        println!("   Total recommended: ${:.2}", summary.total_budget_recommended);
        println!("   Total spent:       ${:.2}", summary.total_spent);
        println!("   Avg transaction:   ${:.2}", summary.average_transaction);
    }
}

fn print_patterns(report: &PatternReport) {
    println!();
    println!("📊 Spending Patterns");
    println!("   ─────────────────────────────────────────────────────────────");
    if print_status(report.message.as_deref(), report.error.as_deref()) {
        return;
    }

    let patterns = &report.patterns;
    match &report.date_range {
        Some(range) => println!(
            "   {} records from {} to {}",
            report.data_points, range.start, range.end
        ),
        None => println!("   {} records", report.data_points),
    }

    if let Some(trend) = &patterns.spending_trend {
        let icon = match trend.direction {
            TrendDirection::Increasing => "📈",
            TrendDirection::Decreasing => "📉",
            TrendDirection::Stable => "➡️ ",
        };
        println!(
            "   {} Trend: {} ({:+.1}%)",
            icon, trend.direction, trend.percentage_change
        );
    }

    if let Some(peak) = &patterns.highest_spending_day {
        println!("   🔥 Highest day: {} (${:.2})", peak.date, peak.amount);
    }

    if !patterns.top_categories.is_empty() {
        println!();
        println!("   {:20} │ {:>10} │ {:>10}", "Top category", "Total", "Volatility");
        println!("   ─────────────────────┼────────────┼────────────");
        for top in &patterns.top_categories {
            let volatility = patterns
                .category_volatility
                .get(&top.category)
                .copied()
                .unwrap_or(0.0);
            println!(
                "   {:20} │ {:>10.2} │ {:>10.2}",
                truncate(&top.category, 20),
                top.total,
                volatility
            );
        }
    }
}
