//! Host adapter: builds the [`ChangeContext`] snapshot from a git work
//! tree.
//!
//! This is the only place that touches the SCM or the filesystem for
//! change data; checks consume the finished snapshot.

pub mod git;

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use crate::models::{AffectedFile, ChangeContext, FileAction, ScmKind};

#[derive(Error, Debug)]
pub enum HostError {
    #[error("{0}")]
    Git(String),
}

/// Inputs for a single gate evaluation, as supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct ChangeSpec {
    pub description: String,
    pub base_ref: String,
    pub issue: Option<u64>,
    pub patchset: Option<u64>,
    pub committing: bool,
    pub tbr: bool,
    pub owner: Option<String>,
    pub host_url: String,
}

/// Build a change snapshot from the repository at `repo_root`.
///
/// File contents are loaded once here; binary and unreadable files keep
/// `content = None` and are skipped by the content scans. Deleted files
/// stay in the affected set (ownership coverage applies to them) but
/// carry no content.
pub async fn build_change_context(
    repo_root: &Path,
    spec: ChangeSpec,
) -> Result<ChangeContext, HostError> {
    let changed = git::changed_files(repo_root, &spec.base_ref).await?;

    let mut files = Vec::with_capacity(changed.len());
    for (action, path) in changed {
        let abs = repo_root.join(&path);
        let is_directory = abs.is_dir();
        let content = if action == FileAction::Delete || is_directory {
            None
        } else {
            tokio::fs::read_to_string(&abs).await.ok()
        };
        files.push(AffectedFile {
            path,
            action,
            is_directory,
            content,
            properties: BTreeMap::new(),
        });
    }

    Ok(ChangeContext::new(
        spec.description,
        files,
        ScmKind::Git,
        spec.issue,
        spec.patchset,
        spec.committing,
        spec.tbr,
        spec.owner,
        spec.host_url,
    ))
}
