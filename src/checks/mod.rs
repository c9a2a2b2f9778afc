//! The `Check` trait and the canned check implementations.
//!
//! Each check evaluates one independent policy against the immutable
//! [`ChangeContext`] and emits zero or more [`ResultItem`]s with a fixed
//! severity. Mode interpretation (upload vs commit) lives in the
//! aggregator, not here.

pub mod description;
pub mod registry;
pub mod scan;
pub mod scm;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ChangeContext, ResultItem};

/// Errors a check can surface to the aggregator.
///
/// Any `Err` is converted by the aggregator into a single Error finding
/// naming the check; it never aborts the remaining checks.
#[derive(Error, Debug)]
pub enum CheckError {
    /// Missing or invalid check configuration (e.g. a bad pattern).
    #[error("configuration fault: {0}")]
    Configuration(String),

    /// Unexpected internal fault.
    #[error("{0}")]
    Internal(String),
}

/// One independent presubmit policy.
#[async_trait]
pub trait Check: Send + Sync {
    /// Stable check identifier, used in output and fault reporting.
    fn name(&self) -> &str;

    /// Evaluate the policy against the change snapshot.
    async fn run(&self, ctx: &ChangeContext) -> Result<Vec<ResultItem>, CheckError>;
}

impl std::fmt::Debug for dyn Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Check").field("name", &self.name()).finish()
    }
}
