//! Best-effort status fetching.
//!
//! All external-status checks go through the [`StatusFetcher`] seam so
//! tests can substitute canned outcomes. Failures are values, not
//! errors: every call resolves to a [`FetchOutcome`] and each check
//! decides how to degrade.

use std::time::Duration;

use async_trait::async_trait;

/// Outcome of a single best-effort fetch. No retries, ever.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// 2xx response body.
    Body(String),
    /// HTTP 404, a recognized sentinel ("no such resource").
    NotFound,
    /// Unreachable endpoint, timeout, or non-404 HTTP error.
    TransportFailure(String),
}

/// One-shot text fetch against a status endpoint.
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// Production fetcher backed by reqwest with a per-request timeout.
///
/// A timeout is reported as a transport failure, which every caller
/// treats as "fail open".
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Fails only if the underlying TLS backend cannot be initialized,
    /// which is a startup fault, not a per-request condition.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl StatusFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let resp = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => return FetchOutcome::TransportFailure(format!("{url}: {e}")),
        };

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return FetchOutcome::NotFound;
        }
        if !status.is_success() {
            return FetchOutcome::TransportFailure(format!("{url}: HTTP {status}"));
        }

        match resp.text().await {
            Ok(body) => FetchOutcome::Body(body),
            Err(e) => FetchOutcome::TransportFailure(format!("{url}: {e}")),
        }
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use super::*;

    /// Test fetcher that replays a fixed outcome for every URL.
    pub struct StubFetcher {
        outcome: FetchOutcome,
    }

    impl StubFetcher {
        pub fn new(outcome: FetchOutcome) -> Self {
            Self { outcome }
        }

        pub fn body(s: &str) -> Self {
            Self::new(FetchOutcome::Body(s.to_string()))
        }
    }

    #[async_trait]
    impl StatusFetcher for StubFetcher {
        async fn fetch(&self, _url: &str) -> FetchOutcome {
            self.outcome.clone()
        }
    }
}
