//! Tree status check: is the shared tree open for commits?
//!
//! Supports two endpoint styles:
//! 1. JSON payload with `can_commit_freely` / `general_state` / `message`.
//! 2. Legacy plain text matched against a configured "closed" pattern.
//!
//! Transport failures and malformed payloads emit nothing: commits are
//! never blocked on status infrastructure being down.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use crate::checks::{Check, CheckError};
use crate::models::{ChangeContext, ResultItem, Severity};

use super::http::{FetchOutcome, StatusFetcher};

const CHECK_NAME: &str = "tree-status";

/// Structured tree-status payload.
#[derive(Debug, Deserialize)]
struct TreeStatus {
    can_commit_freely: bool,
    general_state: String,
    message: String,
}

/// Endpoint configuration: structured JSON or legacy text + pattern.
pub enum TreeEndpoint {
    Json { url: String },
    Legacy { url: String, closed: Regex },
}

impl TreeEndpoint {
    /// Build a legacy endpoint. The closed pattern matches from the
    /// start of the body, not anywhere within it.
    pub fn legacy(url: String, closed_pattern: &str) -> Result<Self, regex::Error> {
        let closed = Regex::new(&format!(r"\A(?:{closed_pattern})"))?;
        Ok(TreeEndpoint::Legacy { url, closed })
    }
}

pub struct TreeStatusCheck {
    fetcher: Arc<dyn StatusFetcher>,
    endpoint: TreeEndpoint,
}

impl TreeStatusCheck {
    pub fn new(fetcher: Arc<dyn StatusFetcher>, endpoint: TreeEndpoint) -> Self {
        Self { fetcher, endpoint }
    }

    /// Classify a structured payload. `None` means the tree is open or
    /// the payload is unusable (fail open).
    fn classify_json(body: &str, url: &str) -> Option<ResultItem> {
        let status: TreeStatus = serde_json::from_str(body).ok()?;
        if status.can_commit_freely {
            return None;
        }
        Some(ResultItem::with_long_text(
            CHECK_NAME,
            Severity::Error,
            format!("Tree state is: {}", status.general_state),
            format!("{}\n{url}", status.message),
        ))
    }

    /// Classify a legacy text payload against the closed pattern.
    fn classify_legacy(body: &str, closed: &Regex, url: &str) -> Option<ResultItem> {
        if !closed.is_match(body) {
            return None;
        }
        Some(ResultItem::with_long_text(
            CHECK_NAME,
            Severity::Error,
            "The tree is closed.",
            format!("{body}\n{url}"),
        ))
    }
}

#[async_trait]
impl Check for TreeStatusCheck {
    fn name(&self) -> &str {
        CHECK_NAME
    }

    async fn run(&self, ctx: &ChangeContext) -> Result<Vec<ResultItem>, CheckError> {
        if !ctx.committing {
            return Ok(Vec::new());
        }

        let url = match &self.endpoint {
            TreeEndpoint::Json { url } => url,
            TreeEndpoint::Legacy { url, .. } => url,
        };

        let body = match self.fetcher.fetch(url).await {
            FetchOutcome::Body(body) => body,
            // Fail open: never block commit on infrastructure flakiness.
            FetchOutcome::NotFound | FetchOutcome::TransportFailure(_) => return Ok(Vec::new()),
        };

        let item = match &self.endpoint {
            TreeEndpoint::Json { url } => Self::classify_json(&body, url),
            TreeEndpoint::Legacy { url, closed } => Self::classify_legacy(&body, closed, url),
        };
        Ok(item.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::change::ScmKind;
    use crate::status::http::stub::StubFetcher;

    fn ctx(committing: bool) -> ChangeContext {
        ChangeContext::new(
            "desc".into(),
            vec![],
            ScmKind::Git,
            Some(1),
            Some(1),
            committing,
            false,
            None,
            "example.com".into(),
        )
    }

    fn json_check(fetcher: StubFetcher) -> TreeStatusCheck {
        TreeStatusCheck::new(
            Arc::new(fetcher),
            TreeEndpoint::Json {
                url: "https://status.example.com/json".into(),
            },
        )
    }

    #[tokio::test]
    async fn open_tree_passes() {
        let body = r#"{"can_commit_freely": true, "general_state": "open", "message": ""}"#;
        let results = json_check(StubFetcher::body(body)).run(&ctx(true)).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn closed_tree_errors_with_state() {
        let body = r#"{"can_commit_freely": false, "general_state": "throttled", "message": "slow down"}"#;
        let results = json_check(StubFetcher::body(body)).run(&ctx(true)).await.unwrap();
        assert_eq!(results.len(), 1);
        match &results[0] {
            ResultItem::Finding { severity, message, long_text, .. } => {
                assert_eq!(*severity, Severity::Error);
                assert_eq!(message, "Tree state is: throttled");
                assert!(long_text.as_deref().unwrap().contains("slow down"));
            }
            other => panic!("unexpected item: {other:?}"),
        }
    }

    #[tokio::test]
    async fn upload_mode_skips_entirely() {
        let body = r#"{"can_commit_freely": false, "general_state": "closed", "message": "no"}"#;
        let results = json_check(StubFetcher::body(body)).run(&ctx(false)).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn transport_failure_fails_open() {
        let check = json_check(StubFetcher::new(FetchOutcome::TransportFailure(
            "connection refused".into(),
        )));
        let results = check.run(&ctx(true)).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn malformed_json_fails_open() {
        let results = json_check(StubFetcher::body("not json"))
            .run(&ctx(true))
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    fn legacy_check(body: &str, pattern: &str) -> TreeStatusCheck {
        TreeStatusCheck::new(
            Arc::new(StubFetcher::body(body)),
            TreeEndpoint::legacy("https://status.example.com/text".into(), pattern).unwrap(),
        )
    }

    #[tokio::test]
    async fn legacy_closed_pattern_matches() {
        let check = legacy_check("closed for maintenance", r"(?i)closed");
        let results = check.run(&ctx(true)).await.unwrap();
        assert_eq!(results.len(), 1);
        match &results[0] {
            ResultItem::Finding { message, long_text, .. } => {
                assert_eq!(message, "The tree is closed.");
                assert!(long_text.as_deref().unwrap().contains("maintenance"));
            }
            other => panic!("unexpected item: {other:?}"),
        }
    }

    #[tokio::test]
    async fn legacy_pattern_matches_from_start_only() {
        // "closed" appearing mid-body is not a closure announcement.
        let check = legacy_check("Tree is closed", "closed");
        let results = check.run(&ctx(true)).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn legacy_open_passes() {
        let check = legacy_check("open", r"(?i)closed");
        let results = check.run(&ctx(true)).await.unwrap();
        assert!(results.is_empty());
    }
}
