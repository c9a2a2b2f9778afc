//! Build-queue backlog check: are too many builds pending?
//!
//! Offline builders and an explicitly ignored set are skipped. The
//! backlog threshold and the ignore set are mandatory configuration;
//! there is no implicit default for either.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::checks::{Check, CheckError};
use crate::models::{ChangeContext, ResultItem, Severity};

use super::http::{FetchOutcome, StatusFetcher};

const CHECK_NAME: &str = "build-queue";

/// Per-builder state as reported by the build-queue endpoint.
#[derive(Debug, Deserialize)]
struct BuilderStatus {
    #[serde(default)]
    state: String,
    #[serde(default)]
    pending_builds: Vec<Value>,
}

pub struct BuildQueueCheck {
    fetcher: Arc<dyn StatusFetcher>,
    url: String,
    max_pending: usize,
    ignored: BTreeSet<String>,
}

impl BuildQueueCheck {
    pub fn new(
        fetcher: Arc<dyn StatusFetcher>,
        url: String,
        max_pending: usize,
        ignored: BTreeSet<String>,
    ) -> Self {
        Self {
            fetcher,
            url,
            max_pending,
            ignored,
        }
    }

    /// Builders over the backlog threshold, in sorted name order.
    fn backlogged(&self, builders: &BTreeMap<String, BuilderStatus>) -> Vec<String> {
        builders
            .iter()
            .filter(|(name, _)| !self.ignored.contains(*name))
            .filter(|(_, builder)| builder.state != "offline")
            .filter(|(_, builder)| builder.pending_builds.len() > self.max_pending)
            .map(|(name, builder)| {
                format!("{name} has {} build(s) pending", builder.pending_builds.len())
            })
            .collect()
    }
}

#[async_trait]
impl Check for BuildQueueCheck {
    fn name(&self) -> &str {
        CHECK_NAME
    }

    async fn run(&self, _ctx: &ChangeContext) -> Result<Vec<ResultItem>, CheckError> {
        let body = match self.fetcher.fetch(&self.url).await {
            FetchOutcome::Body(body) => body,
            FetchOutcome::NotFound | FetchOutcome::TransportFailure(_) => {
                return Ok(vec![ResultItem::finding(
                    CHECK_NAME,
                    Severity::Notify,
                    format!("{} is not accessible", self.url),
                )]);
            }
        };

        let builders: BTreeMap<String, BuilderStatus> = match serde_json::from_str(&body) {
            Ok(builders) => builders,
            Err(_) => {
                return Ok(vec![ResultItem::finding(
                    CHECK_NAME,
                    Severity::Notify,
                    "Received malformed json while looking up build queue status",
                )]);
            }
        };

        let out = self.backlogged(&builders);
        if out.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![ResultItem::with_long_text(
                CHECK_NAME,
                Severity::Warning,
                format!(
                    "Build(s) pending. It is suggested to wait until no more than {} builds are pending.",
                    self.max_pending,
                ),
                out.join("\n"),
            )])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::change::ScmKind;
    use crate::status::http::stub::StubFetcher;

    fn ctx() -> ChangeContext {
        ChangeContext::new(
            "desc".into(),
            vec![],
            ScmKind::Git,
            None,
            None,
            true,
            false,
            None,
            "example.com".into(),
        )
    }

    fn check(fetcher: StubFetcher, max_pending: usize, ignored: &[&str]) -> BuildQueueCheck {
        BuildQueueCheck::new(
            Arc::new(fetcher),
            "https://build.example.com/json/builders".into(),
            max_pending,
            ignored.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn offline_builders_are_skipped() {
        let body = r#"{
            "A": {"state": "running", "pending_builds": [1, 2, 3]},
            "B": {"state": "offline", "pending_builds": [1, 2, 3, 4, 5]}
        }"#;
        let results = check(StubFetcher::body(body), 2, &[]).run(&ctx()).await.unwrap();
        assert_eq!(results.len(), 1);
        match &results[0] {
            ResultItem::Finding { severity, long_text, .. } => {
                assert_eq!(*severity, Severity::Warning);
                let text = long_text.as_deref().unwrap();
                assert!(text.contains("A has 3 build(s) pending"));
                assert!(!text.contains('B'));
            }
            other => panic!("unexpected item: {other:?}"),
        }
    }

    #[tokio::test]
    async fn ignored_builders_are_skipped() {
        let body = r#"{"A": {"state": "running", "pending_builds": [1, 2, 3]}}"#;
        let results = check(StubFetcher::body(body), 2, &["A"]).run(&ctx()).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn under_threshold_passes() {
        let body = r#"{"A": {"state": "running", "pending_builds": [1, 2]}}"#;
        let results = check(StubFetcher::body(body), 2, &[]).run(&ctx()).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn unreachable_endpoint_notifies() {
        let results = check(
            StubFetcher::new(FetchOutcome::TransportFailure("timed out".into())),
            2,
            &[],
        )
        .run(&ctx())
        .await
        .unwrap();
        assert_eq!(results[0].severity(), Some(Severity::Notify));
    }

    #[tokio::test]
    async fn malformed_json_notifies_never_errors() {
        let results = check(StubFetcher::body("<html>oops</html>"), 2, &[])
            .run(&ctx())
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].severity(), Some(Severity::Notify));
    }

    #[tokio::test]
    async fn missing_state_defaults_to_active() {
        let body = r#"{"A": {"pending_builds": [1, 2, 3, 4]}}"#;
        let results = check(StubFetcher::body(body), 3, &[]).run(&ctx()).await.unwrap();
        assert_eq!(results.len(), 1);
    }
}
