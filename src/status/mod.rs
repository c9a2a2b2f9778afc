//! External-status checks: tree state, try jobs, build-queue backlog.
//!
//! Each is a best-effort single fetch with an explicit timeout and no
//! retry. Degradation rules per check: transport faults become Notify or
//! Warning findings (or nothing at all for tree status), never Errors.

pub mod buildqueue;
pub mod http;
pub mod tree;
pub mod tryjobs;

pub use buildqueue::BuildQueueCheck;
pub use http::{FetchOutcome, HttpFetcher, StatusFetcher};
pub use tree::{TreeEndpoint, TreeStatusCheck};
pub use tryjobs::TryJobCheck;
