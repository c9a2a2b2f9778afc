//! Try-job reconciliation: were the per-platform try builds green?
//!
//! Fetches newline-delimited `platform|status|url` records for the
//! change's issue/patchset. A 404 means no try job ran, which is an
//! advisory warning rather than a failure.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::checks::{Check, CheckError};
use crate::models::{ChangeContext, ResultItem, Severity};

use super::http::{FetchOutcome, StatusFetcher};

const CHECK_NAME: &str = "try-jobs";

/// Aggregate try-job classification.
#[derive(Debug, PartialEq, Eq)]
enum TryVerdict {
    Pass,
    /// At least one platform reported "failure".
    Failure(Vec<String>),
    /// No failure, but some platform is not "success" yet.
    Unfinished(Vec<String>),
}

pub struct TryJobCheck {
    fetcher: Arc<dyn StatusFetcher>,
    /// Platforms that must report success.
    platforms: Vec<String>,
    /// Contact to notify when the try server misbehaves.
    contact: String,
}

impl TryJobCheck {
    pub fn new(fetcher: Arc<dyn StatusFetcher>, platforms: Vec<String>, contact: String) -> Self {
        Self {
            fetcher,
            platforms,
            contact,
        }
    }

    /// Parse `platform|status|url` records; malformed lines are dropped.
    ///
    /// Insertion order is preserved so reported offenders are stable for
    /// identical responses.
    fn parse_records(body: &str) -> IndexMap<String, String> {
        body.lines()
            .filter_map(|line| {
                let mut parts = line.splitn(3, '|');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(platform), Some(status), Some(_url)) => {
                        Some((platform.to_string(), status.to_string()))
                    }
                    _ => None,
                }
            })
            .collect()
    }

    /// Classify parsed records against the expected platform list.
    ///
    /// Platforms absent from the response default to "not started".
    fn classify(&self, mut records: IndexMap<String, String>) -> TryVerdict {
        for platform in &self.platforms {
            records
                .entry(platform.clone())
                .or_insert_with(|| "not started".to_string());
        }

        let non_success: Vec<String> = records
            .iter()
            .filter(|(_, status)| status.as_str() != "success")
            .map(|(platform, _)| platform.to_uppercase())
            .collect();

        if records.values().any(|s| s == "failure") {
            TryVerdict::Failure(non_success)
        } else if !non_success.is_empty() {
            TryVerdict::Unfinished(non_success)
        } else {
            TryVerdict::Pass
        }
    }
}

#[async_trait]
impl Check for TryJobCheck {
    fn name(&self) -> &str {
        CHECK_NAME
    }

    async fn run(&self, ctx: &ChangeContext) -> Result<Vec<ResultItem>, CheckError> {
        if !ctx.committing {
            return Ok(Vec::new());
        }
        let (Some(issue), Some(patchset)) = (ctx.issue, ctx.patchset) else {
            return Ok(Vec::new());
        };

        let url = format!("{}/{issue}/get_build_results/{patchset}", ctx.host_url);
        let body = match self.fetcher.fetch(&url).await {
            FetchOutcome::Body(body) => body,
            FetchOutcome::NotFound => {
                // No try job ran for this patchset.
                return Ok(vec![ResultItem::finding(
                    CHECK_NAME,
                    Severity::Warning,
                    "You should try the patch first.",
                )]);
            }
            FetchOutcome::TransportFailure(e) => {
                return Ok(vec![ResultItem::finding(
                    CHECK_NAME,
                    Severity::Warning,
                    format!("Got {e} while looking for try job status."),
                )]);
            }
        };

        if body.trim().is_empty() {
            // Empty response: probably a private review.
            return Ok(Vec::new());
        }

        let records = Self::parse_records(&body);
        if records.is_empty() {
            return Ok(vec![ResultItem::finding(
                CHECK_NAME,
                Severity::Notify,
                "Failed to parse try job results",
            )]);
        }

        let message = match self.classify(records) {
            TryVerdict::Pass => return Ok(Vec::new()),
            TryVerdict::Failure(names) => {
                format!("Try job failures on {}!", names.join(", "))
            }
            TryVerdict::Unfinished(names) => format!(
                "Unfinished (or not even started) try jobs on {}.",
                names.join(", "),
            ),
        };

        Ok(vec![ResultItem::finding(
            CHECK_NAME,
            Severity::Warning,
            format!(
                "{message}\nIs try server wrong or broken? Please notify {}. Thanks.",
                self.contact,
            ),
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::change::ScmKind;
    use crate::status::http::stub::StubFetcher;

    fn ctx(committing: bool, issue: Option<u64>) -> ChangeContext {
        ChangeContext::new(
            "desc".into(),
            vec![],
            ScmKind::Git,
            issue,
            issue.map(|_| 2),
            committing,
            false,
            None,
            "https://codereview.example.com".into(),
        )
    }

    fn check(fetcher: StubFetcher, platforms: &[&str]) -> TryJobCheck {
        TryJobCheck::new(
            Arc::new(fetcher),
            platforms.iter().map(|p| p.to_string()).collect(),
            "bob".into(),
        )
    }

    fn message_of(item: &ResultItem) -> &str {
        match item {
            ResultItem::Finding { message, .. } => message,
            other => panic!("unexpected item: {other:?}"),
        }
    }

    #[tokio::test]
    async fn failure_lists_non_success_platforms_uppercased() {
        let body = "mac|success|http://b/1\nlinux|failure|http://b/2\n";
        let results = check(StubFetcher::body(body), &["mac", "linux", "win"])
            .run(&ctx(true, Some(1)))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        let msg = message_of(&results[0]);
        assert!(msg.contains("Try job failures"));
        assert!(msg.contains("LINUX"));
        assert!(msg.contains("WIN"));
        assert!(!msg.contains("MAC"));
        assert!(msg.contains("bob"));
    }

    #[tokio::test]
    async fn unfinished_when_no_failure_but_pending() {
        let body = "mac|success|u\nlinux|running|u\n";
        let results = check(StubFetcher::body(body), &["mac", "linux"])
            .run(&ctx(true, Some(1)))
            .await
            .unwrap();
        let msg = message_of(&results[0]);
        assert!(msg.contains("Unfinished"));
        assert!(msg.contains("LINUX"));
    }

    #[tokio::test]
    async fn all_success_passes() {
        let body = "mac|success|u\nlinux|success|u\n";
        let results = check(StubFetcher::body(body), &["mac", "linux"])
            .run(&ctx(true, Some(1)))
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn not_found_is_an_advisory_warning() {
        let results = check(StubFetcher::new(FetchOutcome::NotFound), &["mac"])
            .run(&ctx(true, Some(1)))
            .await
            .unwrap();
        assert_eq!(results[0].severity(), Some(Severity::Warning));
        assert!(message_of(&results[0]).contains("try the patch first"));
    }

    #[tokio::test]
    async fn transport_failure_is_a_generic_warning() {
        let results = check(
            StubFetcher::new(FetchOutcome::TransportFailure("HTTP 500".into())),
            &["mac"],
        )
        .run(&ctx(true, Some(1)))
        .await
        .unwrap();
        assert_eq!(results[0].severity(), Some(Severity::Warning));
        assert!(message_of(&results[0]).contains("HTTP 500"));
    }

    #[tokio::test]
    async fn empty_body_passes_silently() {
        let results = check(StubFetcher::body(""), &["mac"])
            .run(&ctx(true, Some(1)))
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn unparseable_body_notifies() {
        let results = check(StubFetcher::body("garbage without pipes\n"), &["mac"])
            .run(&ctx(true, Some(1)))
            .await
            .unwrap();
        assert_eq!(results[0].severity(), Some(Severity::Notify));
    }

    #[tokio::test]
    async fn skipped_without_issue_or_in_upload_mode() {
        let body = "mac|failure|u\n";
        let results = check(StubFetcher::body(body), &["mac"])
            .run(&ctx(true, None))
            .await
            .unwrap();
        assert!(results.is_empty());

        let results = check(StubFetcher::body(body), &["mac"])
            .run(&ctx(false, Some(1)))
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
