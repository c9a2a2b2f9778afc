//! Description checks: required tags and forbidden markers.

use async_trait::async_trait;

use crate::models::{ChangeContext, ResultItem, Severity};

use super::{Check, CheckError};

// Split so the marker never appears verbatim in this source tree.
const DO_NOT_SUBMIT: &str = concat!("DO NOT ", "SUBMIT");

/// Requires that the description carry a given `KEY=` tag.
pub struct HasTagCheck {
    name: String,
    tag: &'static str,
    severity: Severity,
    message: String,
}

impl HasTagCheck {
    pub fn new(tag: &'static str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            name: format!("has-{}-field", tag.to_lowercase()),
            tag,
            severity,
            message: message.into(),
        }
    }

    /// `TEST=` reminder for manual QA instructions.
    pub fn test_field() -> Self {
        Self::new(
            "TEST",
            Severity::Notify,
            "If this change requires manual test instructions to QA team, add TEST=[instructions].",
        )
    }

    /// `BUG=` reminder for an associated bug.
    pub fn bug_field() -> Self {
        Self::new(
            "BUG",
            Severity::Notify,
            "If this change has an associated bug, add BUG=[bug number].",
        )
    }

    /// `TESTED=` requirement.
    pub fn tested_field() -> Self {
        Self::new("TESTED", Severity::Error, "Change must have a TESTED= field.")
    }

    /// `QA=` requirement.
    pub fn qa_field() -> Self {
        Self::new("QA", Severity::Error, "Change must have a QA= field.")
    }
}

#[async_trait]
impl Check for HasTagCheck {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &ChangeContext) -> Result<Vec<ResultItem>, CheckError> {
        if ctx.tag(self.tag).is_some() {
            Ok(Vec::new())
        } else {
            Ok(vec![ResultItem::finding(
                &self.name,
                self.severity,
                self.message.clone(),
            )])
        }
    }
}

/// Rejects the submit-blocking marker in the description.
pub struct NoSubmitMarkerInDescription;

#[async_trait]
impl Check for NoSubmitMarkerInDescription {
    fn name(&self) -> &str {
        "do-not-submit-in-description"
    }

    async fn run(&self, ctx: &ChangeContext) -> Result<Vec<ResultItem>, CheckError> {
        if ctx.description.contains(DO_NOT_SUBMIT) {
            Ok(vec![ResultItem::finding(
                self.name(),
                Severity::Error,
                format!("{DO_NOT_SUBMIT} is present in the change description."),
            )])
        } else {
            Ok(Vec::new())
        }
    }
}

/// Requires the description to be non-empty.
///
/// The severity is fixed per registration: the commit-mode gate registers
/// the Error variant, the upload gate registers Notify. The aggregator
/// alone interprets mode.
pub struct HasDescriptionCheck {
    severity: Severity,
}

impl HasDescriptionCheck {
    pub fn new(severity: Severity) -> Self {
        Self { severity }
    }
}

#[async_trait]
impl Check for HasDescriptionCheck {
    fn name(&self) -> &str {
        "has-description"
    }

    async fn run(&self, ctx: &ChangeContext) -> Result<Vec<ResultItem>, CheckError> {
        if ctx.description.trim().is_empty() {
            Ok(vec![ResultItem::finding(
                self.name(),
                self.severity,
                "Add a description.",
            )])
        } else {
            Ok(Vec::new())
        }
    }
}

/// Rejects the submit-blocking marker in any affected text file.
pub struct NoSubmitMarkerInFiles;

#[async_trait]
impl Check for NoSubmitMarkerInFiles {
    fn name(&self) -> &str {
        "do-not-submit-in-files"
    }

    async fn run(&self, ctx: &ChangeContext) -> Result<Vec<ResultItem>, CheckError> {
        for (path, line_no, line) in ctx.source_lines() {
            if line.contains(DO_NOT_SUBMIT) {
                return Ok(vec![ResultItem::finding(
                    self.name(),
                    Severity::Error,
                    format!("Found {DO_NOT_SUBMIT} in {path}, line {line_no}"),
                )]);
            }
        }
        Ok(Vec::new())
    }
}
