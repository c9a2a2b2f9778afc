//! JSON output renderer.
//!
//! Outputs `{"items": [...], "decision": "...", "summary": {...}}`.

use crate::aggregator::GateReport;
use crate::models::Summary;
use crate::output::OutputRenderer;

/// JSON output renderer.
pub struct JsonRenderer;

impl OutputRenderer for JsonRenderer {
    fn render(&self, report: &GateReport) -> String {
        let summary = Summary::from_results(&report.items);

        let output = serde_json::json!({
            "items": report.items,
            "decision": report.decision,
            "summary": summary,
        });

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}
