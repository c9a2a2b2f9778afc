//! File-backed ownership database.
//!
//! A TOML map of directory prefix to owner identities. An owner listed
//! for a prefix covers every path under it; the empty prefix covers the
//! whole tree. This is the host-side collaborator behind the
//! [`OwnershipDatabase`] seam; hosts with richer ownership models plug
//! in their own implementation.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::OwnershipDatabase;

#[derive(Error, Debug)]
pub enum OwnersDbError {
    #[error("failed to read owners file {0}: {1}")]
    Read(String, std::io::Error),

    #[error("failed to parse owners file {0}: {1}")]
    Parse(String, toml::de::Error),
}

#[derive(Debug, Deserialize)]
struct OwnersFile {
    #[serde(default)]
    paths: BTreeMap<String, Vec<String>>,
}

/// Prefix-matching ownership database.
#[derive(Debug, Default)]
pub struct PrefixOwnersDb {
    /// Directory prefix -> owners. Normalized without trailing slashes.
    paths: BTreeMap<String, BTreeSet<String>>,
}

impl PrefixOwnersDb {
    pub fn from_entries<P, O, S>(entries: impl IntoIterator<Item = (P, O)>) -> Self
    where
        P: Into<String>,
        O: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: entries
                .into_iter()
                .map(|(prefix, owners)| {
                    (
                        normalize_prefix(&prefix.into()),
                        owners.into_iter().map(Into::into).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Load from a TOML owners file.
    pub fn load(path: &Path) -> Result<Self, OwnersDbError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| OwnersDbError::Read(display.clone(), e))?;
        let file: OwnersFile =
            toml::from_str(&content).map_err(|e| OwnersDbError::Parse(display, e))?;
        Ok(Self::from_entries(file.paths))
    }

    /// Owners able to cover `path`, from every matching prefix.
    fn owners_of(&self, path: &str) -> BTreeSet<String> {
        self.paths
            .iter()
            .filter(|(prefix, _)| covers(prefix, path))
            .flat_map(|(_, owners)| owners.iter().cloned())
            .collect()
    }
}

/// Whether `prefix` covers `path` (directory-component match).
fn covers(prefix: &str, path: &str) -> bool {
    prefix.is_empty() || path == prefix || path.starts_with(&format!("{prefix}/"))
}

fn normalize_prefix(prefix: &str) -> String {
    prefix.trim_matches('/').to_string()
}

impl OwnershipDatabase for PrefixOwnersDb {
    fn reviewers_for(&self, paths: &BTreeSet<String>) -> BTreeSet<String> {
        paths.iter().flat_map(|p| self.owners_of(p)).collect()
    }

    fn files_not_covered_by(
        &self,
        paths: &BTreeSet<String>,
        approvers: &BTreeSet<String>,
    ) -> BTreeSet<String> {
        paths
            .iter()
            .filter(|p| self.owners_of(p).is_disjoint(approvers))
            .cloned()
            .collect()
    }
}
