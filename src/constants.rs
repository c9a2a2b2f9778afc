//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and built-in defaults so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "pregate";

/// Local config filename (e.g. `.pregate.toml` in repo root).
pub const CONFIG_FILENAME: &str = ".pregate.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "pregate";

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compilation target triple (set by build.rs).
pub const TARGET: &str = env!("TARGET");

/// Default per-request HTTP timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Default maximum source line length.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 80;

/// Maximum number of long-line findings reported per run.
pub const LONG_LINE_REPORT_CAP: usize = 5;

/// Default approver email pattern (any non-empty address).
pub const DEFAULT_EMAIL_PATTERN: &str = r".+@.+\..+";


// ── Environment variable names ──────────────────────────────────────

pub const ENV_TREE_STATUS_URL: &str = "PREGATE_TREE_STATUS_URL";
pub const ENV_HTTP_TIMEOUT: &str = "PREGATE_HTTP_TIMEOUT_SECS";
pub const ENV_REVIEW_HOST: &str = "PREGATE_REVIEW_HOST";
