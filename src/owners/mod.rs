//! Owners coverage engine.
//!
//! Decides whether a change has adequate reviewer sign-off per the
//! path-ownership database, or proposes reviewers while the change is
//! still being uploaded.

pub mod db;
pub mod thread;

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;

use crate::checks::{Check, CheckError};
use crate::models::{ChangeContext, ResultItem, Severity};

pub use db::PrefixOwnersDb;
pub use thread::{ApprovalMessage, HttpReviewThread, IssueProps, ReviewThreadSource};

const CHECK_NAME: &str = "owners";

/// The approval keyword looked for in review messages.
const APPROVAL_KEYWORD: &str = "lgtm";

/// Path-ownership database (host collaborator).
pub trait OwnershipDatabase: Send + Sync {
    /// Suggest reviewers able to cover the given paths.
    fn reviewers_for(&self, paths: &BTreeSet<String>) -> BTreeSet<String>;

    /// Paths in `paths` not covered by any of `approvers`.
    fn files_not_covered_by(
        &self,
        paths: &BTreeSet<String>,
        approvers: &BTreeSet<String>,
    ) -> BTreeSet<String>;
}

/// How the change owner is excluded from the approver set.
///
/// The historical behavior is a prefix match of the owner's identity
/// against sender identities, which can spuriously exclude unrelated
/// senders sharing a prefix; `Exact` is available for hosts that want
/// strict matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelfApprovalMatch {
    #[default]
    Prefix,
    Exact,
}

impl std::str::FromStr for SelfApprovalMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prefix" => Ok(SelfApprovalMatch::Prefix),
            "exact" => Ok(SelfApprovalMatch::Exact),
            _ => Err(format!("unknown self-approval match mode: {s}")),
        }
    }
}

/// Build the approver set from a review thread.
///
/// An approver is a sender whose message contains the approval keyword
/// (case-insensitive), whose identity matches `email_pattern`, and who
/// is not `owner` (the change owner's identity).
pub fn approvers(
    props: &IssueProps,
    owner: &str,
    email_pattern: &Regex,
    self_match: SelfApprovalMatch,
) -> BTreeSet<String> {
    let is_owner = |sender: &str| match self_match {
        SelfApprovalMatch::Exact => sender == owner,
        SelfApprovalMatch::Prefix => sender.starts_with(owner),
    };

    props
        .messages
        .iter()
        .filter(|m| m.text.to_lowercase().contains(APPROVAL_KEYWORD))
        .filter(|m| email_pattern.is_match(&m.sender))
        .filter(|m| !is_owner(&m.sender))
        .map(|m| m.sender.clone())
        .collect()
}

/// Reviewer sign-off enforcement and reviewer suggestion.
pub struct OwnersCheck {
    db: Arc<dyn OwnershipDatabase>,
    thread: Arc<dyn ReviewThreadSource>,
    email_pattern: Regex,
    self_match: SelfApprovalMatch,
}

impl OwnersCheck {
    pub fn new(
        db: Arc<dyn OwnershipDatabase>,
        thread: Arc<dyn ReviewThreadSource>,
        email_pattern: &str,
        self_match: SelfApprovalMatch,
    ) -> Result<Self, CheckError> {
        let email_pattern = Regex::new(email_pattern)
            .map_err(|e| CheckError::Configuration(format!("invalid email pattern: {e}")))?;
        Ok(Self {
            db,
            thread,
            email_pattern,
            self_match,
        })
    }
}

#[async_trait]
impl Check for OwnersCheck {
    fn name(&self) -> &str {
        CHECK_NAME
    }

    async fn run(&self, ctx: &ChangeContext) -> Result<Vec<ResultItem>, CheckError> {
        if ctx.committing && ctx.tbr {
            return Ok(vec![ResultItem::finding(
                CHECK_NAME,
                Severity::Notify,
                "--tbr was specified, skipping owners check",
            )]);
        }

        let paths = ctx.paths();

        if ctx.committing {
            // A change without a review thread is not an owners
            // violation at this layer.
            let Some(issue) = ctx.issue else {
                return Ok(Vec::new());
            };
            let Some(props) = self.thread.issue_props(&ctx.host_url, issue).await else {
                return Ok(Vec::new());
            };

            // A locally asserted owner identity overrides the one the
            // review host reports for the issue.
            let owner = ctx.owner.as_deref().unwrap_or(&props.owner);
            let approvers = approvers(&props, owner, &self.email_pattern, self.self_match);
            let missing = self.db.files_not_covered_by(&paths, &approvers);
            if missing.is_empty() {
                return Ok(Vec::new());
            }
            let missing: Vec<String> = missing.into_iter().collect();
            return Ok(vec![ResultItem::finding(
                CHECK_NAME,
                Severity::Error,
                format!("Missing LGTM from an OWNER for: {}", missing.join(",")),
            )]);
        }

        // Upload mode: suggest reviewers unless some are already named.
        if ctx.tag("R").is_some() {
            return Ok(Vec::new());
        }
        let suggested: Vec<String> = self.db.reviewers_for(&paths).into_iter().collect();
        Ok(vec![ResultItem::ReviewerSuggestion {
            check: CHECK_NAME.to_string(),
            reviewers: suggested,
        }])
    }
}
