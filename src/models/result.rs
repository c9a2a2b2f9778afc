//! Result types: severities, findings, and the gate decision.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level of a check finding.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message; never affects the gate decision.
    Notify,
    /// Should be addressed; blocks only via AllowWithWarning prompting.
    Warning,
    /// Must be fixed before commit.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Notify => write!(f, "notify"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "notify" => Ok(Severity::Notify),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

/// One item produced by a check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultItem {
    /// A policy finding with a fixed severity.
    Finding {
        /// Name of the check that produced this item.
        check: String,
        severity: Severity,
        /// Short message.
        message: String,
        /// Optional long-form text (raw payloads, per-line listings).
        #[serde(skip_serializing_if = "Option::is_none")]
        long_text: Option<String>,
        /// Referenced items: paths, builder names, `path, line N` pairs.
        #[serde(skip_serializing_if = "Vec::is_empty", default)]
        items: Vec<String>,
    },
    /// Proposed reviewers for an upload. Advisory metadata channel:
    /// carries no severity and is excluded from the gate decision.
    ReviewerSuggestion {
        check: String,
        reviewers: Vec<String>,
    },
}

impl ResultItem {
    /// A finding with just a message.
    pub fn finding(check: &str, severity: Severity, message: impl Into<String>) -> Self {
        ResultItem::Finding {
            check: check.to_string(),
            severity,
            message: message.into(),
            long_text: None,
            items: Vec::new(),
        }
    }

    /// A finding with referenced items.
    pub fn with_items(
        check: &str,
        severity: Severity,
        message: impl Into<String>,
        items: Vec<String>,
    ) -> Self {
        ResultItem::Finding {
            check: check.to_string(),
            severity,
            message: message.into(),
            long_text: None,
            items,
        }
    }

    /// A finding carrying long-form text.
    pub fn with_long_text(
        check: &str,
        severity: Severity,
        message: impl Into<String>,
        long_text: impl Into<String>,
    ) -> Self {
        ResultItem::Finding {
            check: check.to_string(),
            severity,
            message: message.into(),
            long_text: Some(long_text.into()),
            items: Vec::new(),
        }
    }

    /// The severity of this item, if it carries one.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            ResultItem::Finding { severity, .. } => Some(*severity),
            ResultItem::ReviewerSuggestion { .. } => None,
        }
    }

    /// Name of the producing check.
    pub fn check(&self) -> &str {
        match self {
            ResultItem::Finding { check, .. } => check,
            ResultItem::ReviewerSuggestion { check, .. } => check,
        }
    }
}

/// The aggregate gate outcome for a change in a given mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    Allow,
    AllowWithWarning,
    Block,
}

impl GateDecision {
    /// Fold the complete item sequence into a decision.
    ///
    /// Upload mode is advisory-only: all findings are shown but never
    /// block. Reviewer suggestions carry no severity and are skipped.
    pub fn from_results(items: &[ResultItem], committing: bool) -> Self {
        if !committing {
            return GateDecision::Allow;
        }
        let worst = items.iter().filter_map(ResultItem::severity).max();
        match worst {
            Some(Severity::Error) => GateDecision::Block,
            Some(Severity::Warning) => GateDecision::AllowWithWarning,
            _ => GateDecision::Allow,
        }
    }
}

impl fmt::Display for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateDecision::Allow => write!(f, "allow"),
            GateDecision::AllowWithWarning => write!(f, "allow-with-warning"),
            GateDecision::Block => write!(f, "block"),
        }
    }
}

/// Summary statistics for a gate run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub notifications: usize,
    pub suggestions: usize,
}

impl Summary {
    /// Compute a summary from a list of result items.
    pub fn from_results(items: &[ResultItem]) -> Self {
        let mut s = Summary::default();
        for item in items {
            s.total += 1;
            match item.severity() {
                Some(Severity::Error) => s.errors += 1,
                Some(Severity::Warning) => s.warnings += 1,
                Some(Severity::Notify) => s.notifications += 1,
                None => s.suggestions += 1,
            }
        }
        s
    }
}
