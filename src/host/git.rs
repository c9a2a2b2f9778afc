//! Git CLI wrapper for enumerating affected files.
//!
//! Shells out to `git` via `tokio::process::Command`.

use std::path::Path;

use crate::models::FileAction;

use super::HostError;

/// Run `git diff --name-status <base_ref>` and parse the affected list.
///
/// Rename/copy records carry two paths; the destination (last field) is
/// the affected one. Unknown status letters are skipped.
pub async fn changed_files(
    repo_root: &Path,
    base_ref: &str,
) -> Result<Vec<(FileAction, String)>, HostError> {
    let output = tokio::process::Command::new("git")
        .args(["diff", "--name-status", base_ref])
        .current_dir(repo_root)
        .output()
        .await
        .map_err(|e| HostError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(HostError::Git(format!(
            "git diff failed (exit {}): {stderr}",
            output.status
        )));
    }

    let stdout = String::from_utf8(output.stdout)
        .map_err(|e| HostError::Git(format!("git output is not valid UTF-8: {e}")))?;

    Ok(parse_name_status(&stdout))
}

/// Parse `git diff --name-status` output lines.
pub fn parse_name_status(output: &str) -> Vec<(FileAction, String)> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let status = fields.next()?;
            let action = FileAction::from_status_letter(status)?;
            let path = fields.next_back()?;
            if path.is_empty() {
                return None;
            }
            Some((action, path.to_string()))
        })
        .collect()
}

/// Read the full HEAD commit message, used as the change description
/// when the caller supplies none.
pub async fn head_commit_message(repo_root: &Path) -> Result<String, HostError> {
    let output = tokio::process::Command::new("git")
        .args(["log", "-1", "--format=%B"])
        .current_dir(repo_root)
        .output()
        .await
        .map_err(|e| HostError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(HostError::Git(format!(
            "git log failed (exit {}): {stderr}",
            output.status
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
}

/// Find the root of the git repository containing `start_dir`.
pub async fn find_repo_root(start_dir: &Path) -> Result<String, HostError> {
    let output = tokio::process::Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(start_dir)
        .output()
        .await
        .map_err(|e| HostError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(HostError::Git(format!("not a git repository: {stderr}")));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
