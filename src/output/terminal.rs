//! Terminal renderer: styled flowing text grouped by check.

use colored::Colorize;

use crate::aggregator::GateReport;
use crate::models::{GateDecision, ResultItem, Severity, Summary};
use crate::output::OutputRenderer;

/// Terminal output renderer with colored, flowing text.
pub struct TerminalRenderer;

impl OutputRenderer for TerminalRenderer {
    fn render(&self, report: &GateReport) -> String {
        let mut output = String::new();

        if report.items.is_empty() {
            output.push_str(&format!("{}", "  ✔ No findings.\n".green()));
        }

        for item in &report.items {
            match item {
                ResultItem::Finding {
                    check,
                    severity,
                    message,
                    long_text,
                    items,
                } => {
                    let (icon, severity_str) = match severity {
                        Severity::Error => (
                            "✖".red().bold().to_string(),
                            "error".red().bold().to_string(),
                        ),
                        Severity::Warning => (
                            "⚠".yellow().bold().to_string(),
                            "warning".yellow().bold().to_string(),
                        ),
                        Severity::Notify => (
                            "ℹ".blue().bold().to_string(),
                            "notify".blue().bold().to_string(),
                        ),
                    };

                    output.push_str(&format!(
                        " {} {} [{}]\n",
                        icon,
                        severity_str,
                        check.bold()
                    ));
                    output.push_str(&format!("   {message}\n"));

                    for referenced in items {
                        output.push_str(&format!("   {} {}\n", "→".cyan(), referenced));
                    }
                    if let Some(text) = long_text {
                        for line in text.lines() {
                            output.push_str(&format!("   {}\n", line.dimmed()));
                        }
                    }
                    output.push('\n');
                }
                ResultItem::ReviewerSuggestion { reviewers, .. } => {
                    output.push_str(&format!(
                        " {} {}\n",
                        "☰".cyan().bold(),
                        "suggested reviewers".bold()
                    ));
                    if reviewers.is_empty() {
                        output.push_str("   (no reviewers found for the touched paths)\n");
                    }
                    for reviewer in reviewers {
                        output.push_str(&format!("   {} {}\n", "→".cyan(), reviewer));
                    }
                    output.push('\n');
                }
            }
        }

        // Summary and decision lines
        let summary = Summary::from_results(&report.items);
        output.push_str(&format!(
            "{}\n",
            "───────────────────────────────────".dimmed()
        ));
        output.push_str(&format!(
            " {} findings: {} {}, {} {}, {} {}\n",
            summary.total.to_string().bold(),
            summary.errors.to_string().red().bold(),
            if summary.errors == 1 { "error" } else { "errors" },
            summary.warnings.to_string().yellow().bold(),
            if summary.warnings == 1 {
                "warning"
            } else {
                "warnings"
            },
            summary.notifications.to_string().blue().bold(),
            if summary.notifications == 1 {
                "notification"
            } else {
                "notifications"
            },
        ));

        let decision = match report.decision {
            GateDecision::Allow => "allow".green().bold().to_string(),
            GateDecision::AllowWithWarning => "allow-with-warning".yellow().bold().to_string(),
            GateDecision::Block => "block".red().bold().to_string(),
        };
        output.push_str(&format!(" gate: {decision}\n"));

        output
    }
}
