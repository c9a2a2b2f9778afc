//! Output renderers: terminal and JSON.

pub mod json;
pub mod terminal;

use crate::aggregator::GateReport;

/// Trait for rendering a gate report to an output format.
pub trait OutputRenderer {
    /// Render the report to a string.
    fn render(&self, report: &GateReport) -> String;
}
