//! Content-scan family: predicate scans over affected text lines.
//!
//! Every scan here reads only from the host-supplied line/file iterators
//! on [`ChangeContext`] and emits findings with a fixed severity. Output
//! is bounded where the original is (long lines cap at
//! [`LONG_LINE_REPORT_CAP`]).

use async_trait::async_trait;
use regex::Regex;

use crate::constants::{DEFAULT_MAX_LINE_LENGTH, LONG_LINE_REPORT_CAP};
use crate::models::{ChangeContext, ResultItem, Severity};

use super::{Check, CheckError};

/// Lines with these prefixes may exceed the length limit.
const LENGTH_EXEMPT_PREFIXES: &[&str] =
    &["#define", "#include", "#import", "#pragma", "#if", "#endif"];

/// Rejects carriage-return characters in affected files.
pub struct NoCrCheck;

#[async_trait]
impl Check for NoCrCheck {
    fn name(&self) -> &str {
        "no-cr"
    }

    async fn run(&self, ctx: &ChangeContext) -> Result<Vec<ResultItem>, CheckError> {
        let cr_files: Vec<String> = ctx
            .source_files()
            .filter(|f| f.content.as_deref().is_some_and(|c| c.contains('\r')))
            .map(|f| f.path.clone())
            .collect();
        if cr_files.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![ResultItem::with_items(
                self.name(),
                Severity::Warning,
                "Found a CR character in these files:",
                cr_files,
            )])
        }
    }
}

/// Requires files to end in exactly one newline.
pub struct SingleEolCheck;

#[async_trait]
impl Check for SingleEolCheck {
    fn name(&self) -> &str {
        "single-eol"
    }

    async fn run(&self, ctx: &ChangeContext) -> Result<Vec<ResultItem>, CheckError> {
        let eof_files: Vec<String> = ctx
            .source_files()
            .filter(|f| {
                let contents = f.content.as_deref().unwrap_or_default();
                contents.len() > 1 && (!contents.ends_with('\n') || contents.ends_with("\n\n"))
            })
            .map(|f| f.path.clone())
            .collect();
        if eof_files.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![ResultItem::with_items(
                self.name(),
                Severity::Warning,
                "These files should end in one (and only one) newline character:",
                eof_files,
            )])
        }
    }
}

/// Rejects tab characters outside of Makefiles.
pub struct NoTabsCheck;

#[async_trait]
impl Check for NoTabsCheck {
    fn name(&self) -> &str {
        "no-tabs"
    }

    async fn run(&self, ctx: &ChangeContext) -> Result<Vec<ResultItem>, CheckError> {
        let mut tabs = Vec::new();
        for (path, line_no, line) in ctx.source_lines() {
            let basename = path.rsplit('/').next().unwrap_or(path);
            if matches!(basename, "Makefile" | "makefile") {
                continue;
            }
            if line.contains('\t') {
                tabs.push(format!("{path}, line {line_no}"));
            }
        }
        if tabs.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![ResultItem::with_long_text(
                self.name(),
                Severity::Warning,
                "Found a tab character in:",
                tabs.join("\n"),
            )])
        }
    }
}

/// Rejects `TODO` without an owner in parentheses.
pub struct TodoHasOwnerCheck {
    pattern: Regex,
}

impl TodoHasOwnerCheck {
    pub fn new() -> Self {
        // Split so the scan does not match its own source.
        let marker = concat!("TO", "DO");
        Self {
            pattern: Regex::new(&format!("{marker}[^(]")).expect("static pattern"),
        }
    }
}

impl Default for TodoHasOwnerCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Check for TodoHasOwnerCheck {
    fn name(&self) -> &str {
        "todo-has-owner"
    }

    async fn run(&self, ctx: &ChangeContext) -> Result<Vec<ResultItem>, CheckError> {
        for (path, line_no, line) in ctx.source_lines() {
            if self.pattern.is_match(line) {
                return Ok(vec![ResultItem::finding(
                    self.name(),
                    Severity::Warning,
                    format!(
                        "Found {} with no owner in {path}, line {line_no}",
                        concat!("TO", "DO"),
                    ),
                )]);
            }
        }
        Ok(Vec::new())
    }
}

/// Rejects trailing whitespace at ends of lines.
pub struct NoStrayWhitespaceCheck;

#[async_trait]
impl Check for NoStrayWhitespaceCheck {
    fn name(&self) -> &str {
        "no-stray-whitespace"
    }

    async fn run(&self, ctx: &ChangeContext) -> Result<Vec<ResultItem>, CheckError> {
        let mut errors = Vec::new();
        for (path, line_no, line) in ctx.source_lines() {
            if line.trim_end() != line {
                errors.push(format!("{path}, line {line_no}"));
            }
        }
        if errors.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![ResultItem::with_long_text(
                self.name(),
                Severity::Warning,
                "Found line ending with white spaces in:",
                errors.join("\n"),
            )])
        }
    }
}

/// Rejects lines longer than the configured maximum.
///
/// Lines containing URL schemes and lines starting with preprocessor
/// directives are exempt. Reports at most the first
/// [`LONG_LINE_REPORT_CAP`] offenders.
pub struct LongLinesCheck {
    max_length: usize,
}

impl LongLinesCheck {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    fn is_exempt(line: &str) -> bool {
        line.contains("http://")
            || line.contains("https://")
            || LENGTH_EXEMPT_PREFIXES.iter().any(|p| line.starts_with(p))
    }
}

impl Default for LongLinesCheck {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LENGTH)
    }
}

#[async_trait]
impl Check for LongLinesCheck {
    fn name(&self) -> &str {
        "long-lines"
    }

    async fn run(&self, ctx: &ChangeContext) -> Result<Vec<ResultItem>, CheckError> {
        let mut bad = Vec::new();
        for (path, line_no, line) in ctx.source_lines() {
            if line.chars().count() > self.max_length && !Self::is_exempt(line) {
                bad.push(format!("{path}, line {line_no}, {} chars", line.chars().count()));
                if bad.len() == LONG_LINE_REPORT_CAP {
                    break;
                }
            }
        }
        if bad.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![ResultItem::with_items(
                self.name(),
                Severity::Warning,
                format!(
                    "Found lines longer than {} characters (first {} shown).",
                    self.max_length, LONG_LINE_REPORT_CAP,
                ),
                bad,
            )])
        }
    }
}

/// Verifies the license header against a configured pattern.
#[derive(Debug)]
pub struct LicenseHeaderCheck {
    pattern: Regex,
    accept_empty_files: bool,
}

impl LicenseHeaderCheck {
    pub fn new(pattern: &str, accept_empty_files: bool) -> Result<Self, CheckError> {
        let pattern = Regex::new(&format!("(?m){pattern}"))
            .map_err(|e| CheckError::Configuration(format!("invalid license pattern: {e}")))?;
        Ok(Self {
            pattern,
            accept_empty_files,
        })
    }
}

#[async_trait]
impl Check for LicenseHeaderCheck {
    fn name(&self) -> &str {
        "license-header"
    }

    async fn run(&self, ctx: &ChangeContext) -> Result<Vec<ResultItem>, CheckError> {
        let mut bad_files = Vec::new();
        for f in ctx.source_files() {
            let contents = f.content.as_deref().unwrap_or_default();
            if self.accept_empty_files && contents.is_empty() {
                continue;
            }
            if !self.pattern.is_match(contents) {
                bad_files.push(f.path.clone());
            }
        }
        if bad_files.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![ResultItem::with_items(
                self.name(),
                Severity::Warning,
                "Found a bad license header in these files:",
                bad_files,
            )])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::change::{AffectedFile, FileAction, ScmKind};
    use std::collections::BTreeMap;

    fn file(path: &str, content: &str) -> AffectedFile {
        AffectedFile {
            path: path.into(),
            action: FileAction::Modify,
            is_directory: false,
            content: Some(content.into()),
            properties: BTreeMap::new(),
        }
    }

    fn ctx(files: Vec<AffectedFile>) -> ChangeContext {
        ChangeContext::new(
            "desc".into(),
            files,
            ScmKind::Git,
            None,
            None,
            true,
            false,
            None,
            "example.com".into(),
        )
    }

    fn items_of(item: &ResultItem) -> Vec<&str> {
        match item {
            ResultItem::Finding { items, .. } => items.iter().map(String::as_str).collect(),
            other => panic!("unexpected item: {other:?}"),
        }
    }

    #[tokio::test]
    async fn cr_files_listed() {
        let results = NoCrCheck
            .run(&ctx(vec![
                file("clean.rs", "ok\n"),
                file("dos.rs", "bad\r\n"),
            ]))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(items_of(&results[0]), ["dos.rs"]);
    }

    #[tokio::test]
    async fn eol_check_flags_missing_and_double_newline() {
        let results = SingleEolCheck
            .run(&ctx(vec![
                file("good.rs", "fine\n"),
                file("none.rs", "no newline"),
                file("double.rs", "two\n\n"),
            ]))
            .await
            .unwrap();
        assert_eq!(items_of(&results[0]), ["none.rs", "double.rs"]);
    }

    #[tokio::test]
    async fn tabs_flagged_except_makefiles() {
        let results = NoTabsCheck
            .run(&ctx(vec![
                file("src/a.rs", "\tindent\n"),
                file("sub/Makefile", "\ttarget\n"),
            ]))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        match &results[0] {
            ResultItem::Finding { long_text, .. } => {
                let text = long_text.as_deref().unwrap();
                assert!(text.contains("src/a.rs, line 1"));
                assert!(!text.contains("Makefile"));
            }
            other => panic!("unexpected item: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unowned_todo_flagged() {
        let marker = concat!("TO", "DO");
        let owned = format!("// {marker}(alice): later\n");
        let unowned = format!("// {marker}: later\n");

        let results = TodoHasOwnerCheck::new()
            .run(&ctx(vec![file("a.rs", &owned)]))
            .await
            .unwrap();
        assert!(results.is_empty());

        let results = TodoHasOwnerCheck::new()
            .run(&ctx(vec![file("a.rs", &unowned)]))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn stray_whitespace_lists_lines() {
        let results = NoStrayWhitespaceCheck
            .run(&ctx(vec![file("a.rs", "clean\ntrailing \nalso\t\n")]))
            .await
            .unwrap();
        match &results[0] {
            ResultItem::Finding { long_text, .. } => {
                let text = long_text.as_deref().unwrap();
                assert!(text.contains("a.rs, line 2"));
                assert!(text.contains("a.rs, line 3"));
            }
            other => panic!("unexpected item: {other:?}"),
        }
    }

    #[tokio::test]
    async fn long_lines_capped_at_five() {
        let long = "x".repeat(100);
        let content = format!("{long}\n").repeat(6);
        let results = LongLinesCheck::new(80)
            .run(&ctx(vec![file("big.rs", &content)]))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(items_of(&results[0]).len(), 5);
    }

    #[tokio::test]
    async fn long_lines_exemptions() {
        let url_line = format!("// see https://example.com/{}\n", "y".repeat(90));
        let include_line = format!("#include <{}>\n", "z".repeat(90));
        let results = LongLinesCheck::new(80)
            .run(&ctx(vec![file("a.cc", &format!("{url_line}{include_line}"))]))
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn license_accepts_empty_files_by_default() {
        let check = LicenseHeaderCheck::new(r"Copyright \d{4}", true).unwrap();
        let results = check.run(&ctx(vec![file("empty.rs", "")])).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn license_flags_missing_header() {
        let check = LicenseHeaderCheck::new(r"Copyright \d{4}", true).unwrap();
        let results = check
            .run(&ctx(vec![
                file("good.rs", "// Copyright 2026 Example\nfn main() {}\n"),
                file("bad.rs", "fn main() {}\n"),
            ]))
            .await
            .unwrap();
        assert_eq!(items_of(&results[0]), ["bad.rs"]);
    }

    #[tokio::test]
    async fn invalid_license_pattern_is_a_configuration_fault() {
        let err = LicenseHeaderCheck::new(r"([unclosed", true).unwrap_err();
        assert!(err.to_string().contains("configuration fault"));
    }
}
