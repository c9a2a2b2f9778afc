//! The immutable change snapshot that every check evaluates against.
//!
//! A [`ChangeContext`] is built once per invocation by the host adapter
//! (see `crate::host`) and shared read-only between checks. Checks never
//! mutate it.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// What happened to an affected file in this change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAction {
    Add,
    Modify,
    Delete,
}

impl FileAction {
    /// Parse a git name-status letter (`A`, `M`, `D`, `R...`, `C...`).
    ///
    /// Renames and copies surface the destination path, so they count
    /// as additions.
    pub fn from_status_letter(s: &str) -> Option<Self> {
        match s.chars().next()? {
            'A' | 'R' | 'C' => Some(FileAction::Add),
            'M' | 'T' => Some(FileAction::Modify),
            'D' => Some(FileAction::Delete),
            _ => None,
        }
    }
}

/// Source control system the change lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScmKind {
    #[default]
    Git,
    Svn,
    None,
}

/// One file touched by the change.
#[derive(Debug, Clone)]
pub struct AffectedFile {
    /// Path relative to the repo root.
    pub path: String,
    pub action: FileAction,
    pub is_directory: bool,
    /// Loaded text content of the post-change file.
    ///
    /// `None` for deleted, binary, or unreadable files; such files are
    /// skipped by the content scans.
    pub content: Option<String>,
    /// SCM properties (e.g. `svn:eol-style`). Empty for git.
    pub properties: BTreeMap<String, String>,
}

impl AffectedFile {
    /// Look up an SCM property by name.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Whether this file has scannable text content.
    pub fn is_text(&self) -> bool {
        self.content.is_some() && self.action != FileAction::Delete && !self.is_directory
    }
}

/// Immutable snapshot of the pending change under evaluation.
#[derive(Debug, Clone)]
pub struct ChangeContext {
    /// Full free-text description.
    pub description: String,
    /// `KEY=value` tags parsed from the description (TEST, BUG, R, ...).
    tags: BTreeMap<String, String>,
    /// Ordered affected file set.
    pub files: Vec<AffectedFile>,
    pub scm: ScmKind,
    /// Review issue id, when the change has been uploaded.
    pub issue: Option<u64>,
    /// Patchset id within the review issue.
    pub patchset: Option<u64>,
    /// `true` when evaluating immediately before commit; `false` for upload.
    pub committing: bool,
    /// To-be-reviewed override: bypass owners coverage enforcement.
    pub tbr: bool,
    /// Change owner identity (email), when known.
    pub owner: Option<String>,
    /// Base review-host URL (scheme optional).
    pub host_url: String,
}

impl ChangeContext {
    /// Build a context, parsing description tags once.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        description: String,
        files: Vec<AffectedFile>,
        scm: ScmKind,
        issue: Option<u64>,
        patchset: Option<u64>,
        committing: bool,
        tbr: bool,
        owner: Option<String>,
        host_url: String,
    ) -> Self {
        let tags = parse_tags(&description);
        Self {
            description,
            tags,
            files,
            scm,
            issue,
            patchset,
            committing,
            tbr,
            owner,
            host_url,
        }
    }

    /// Look up a recognized description tag (`TEST`, `BUG`, `R`, ...).
    ///
    /// Returns `None` when the tag is absent or has an empty value.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Affected text files with loaded content, in declaration order.
    pub fn source_files(&self) -> impl Iterator<Item = &AffectedFile> {
        self.files.iter().filter(|f| f.is_text())
    }

    /// `(path, line_no, line)` tuples over all affected text files.
    ///
    /// Line numbers are 1-based. This is the input contract for the
    /// content-scan family.
    pub fn source_lines(&self) -> impl Iterator<Item = (&str, u32, &str)> {
        self.source_files().flat_map(|f| {
            let path = f.path.as_str();
            f.content
                .as_deref()
                .unwrap_or_default()
                .lines()
                .enumerate()
                .map(move |(i, line)| (path, i as u32 + 1, line))
        })
    }

    /// Set of all affected paths (any action), sorted.
    pub fn paths(&self) -> BTreeSet<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// Parse `KEY=value` tags from description lines.
///
/// Only lines that start with an uppercase key directly followed by `=`
/// are recognized; the rest of the line is the value. Later occurrences
/// of the same key win, matching last-write semantics of hand-edited
/// descriptions.
fn parse_tags(description: &str) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    for line in description.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_uppercase() || c == '_') {
            continue;
        }
        tags.insert(key.to_string(), value.trim().to_string());
    }
    tags
}
