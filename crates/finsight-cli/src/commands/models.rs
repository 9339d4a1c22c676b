//! Listing of the available analyses

use anyhow::Result;
use finsight_core::{AnalysisKind, AnalyticsEngine, Analyzer};
use serde_json::json;

use super::print_json;

/// Analyzer name for each analysis
fn analyzer_name(engine: &AnalyticsEngine, kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::AnomalyDetection => engine.anomaly_detector().name(),
        AnalysisKind::ExpensePrediction => engine.forecaster().name(),
        AnalysisKind::BudgetRecommendations => engine.budget_recommender().name(),
        AnalysisKind::PatternAnalysis => engine.pattern_analyzer().name(),
    }
}

pub fn cmd_models(json: bool) -> Result<()> {
    let engine = AnalyticsEngine::default();
    let kinds = engine.analysis_kinds();

    if json {
        let models: Vec<_> = kinds
            .iter()
            .map(|kind| json!({ "id": kind.as_str(), "name": analyzer_name(&engine, *kind) }))
            .collect();
        return print_json(&json!({ "available_models": models }));
    }

    println!();
    println!("🧠 Available Analyses");
    println!("   ─────────────────────────────────────────────");
    for kind in kinds {
        println!("   {:24} {}", kind.as_str(), analyzer_name(&engine, kind));
    }

    Ok(())
}
