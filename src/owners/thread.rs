//! Review-thread API client.
//!
//! `GET {host}/api/{issue}?messages=true` returns the issue owner and
//! the message stream; the owners check mines it for approvals. A failed
//! or unparseable fetch yields `None`; the caller skips coverage
//! evaluation entirely, because a missing thread is not itself a policy
//! violation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::status::http::{FetchOutcome, StatusFetcher};

/// One message in the review thread.
#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalMessage {
    pub sender: String,
    pub text: String,
}

/// Owner and messages for a review issue.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueProps {
    pub owner: String,
    #[serde(default)]
    pub messages: Vec<ApprovalMessage>,
}

/// Source of review-thread data.
#[async_trait]
pub trait ReviewThreadSource: Send + Sync {
    /// Fetch owner and messages for an issue; `None` on any failure.
    async fn issue_props(&self, host_url: &str, issue: u64) -> Option<IssueProps>;
}

/// Production source over the review host's JSON API.
pub struct HttpReviewThread {
    fetcher: Arc<dyn StatusFetcher>,
}

impl HttpReviewThread {
    pub fn new(fetcher: Arc<dyn StatusFetcher>) -> Self {
        Self { fetcher }
    }
}

/// Normalize a bare review host to a full URL.
fn normalize_host(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

#[async_trait]
impl ReviewThreadSource for HttpReviewThread {
    async fn issue_props(&self, host_url: &str, issue: u64) -> Option<IssueProps> {
        let url = format!("{}/api/{issue}?messages=true", normalize_host(host_url));
        match self.fetcher.fetch(&url).await {
            FetchOutcome::Body(body) => serde_json::from_str(&body).ok(),
            FetchOutcome::NotFound | FetchOutcome::TransportFailure(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::http::stub::StubFetcher;

    #[test]
    fn normalizes_bare_host() {
        assert_eq!(
            normalize_host("codereview.example.com"),
            "https://codereview.example.com"
        );
        assert_eq!(
            normalize_host("http://codereview.example.com"),
            "http://codereview.example.com"
        );
    }

    #[tokio::test]
    async fn parses_issue_props() {
        let body = r#"{
            "owner": "carol@example.com",
            "messages": [{"sender": "dave@example.com", "text": "LGTM"}]
        }"#;
        let thread = HttpReviewThread::new(Arc::new(StubFetcher::body(body)));
        let props = thread.issue_props("example.com", 7).await.unwrap();
        assert_eq!(props.owner, "carol@example.com");
        assert_eq!(props.messages.len(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_yields_none() {
        let thread = HttpReviewThread::new(Arc::new(StubFetcher::new(
            FetchOutcome::TransportFailure("down".into()),
        )));
        assert!(thread.issue_props("example.com", 7).await.is_none());
    }

    #[tokio::test]
    async fn malformed_payload_yields_none() {
        let thread = HttpReviewThread::new(Arc::new(StubFetcher::body("not json")));
        assert!(thread.issue_props("example.com", 7).await.is_none());
    }
}
