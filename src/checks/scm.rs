//! SCM property checks.
//!
//! Only meaningful for svn-backed changes; any other SCM kind passes
//! silently.

use async_trait::async_trait;

use crate::models::{ChangeContext, ResultItem, ScmKind, Severity};

use super::{Check, CheckError};

/// Requires every affected source file to carry `prop=expected`.
pub struct ScmPropertyCheck {
    name: String,
    prop: String,
    expected: String,
}

impl ScmPropertyCheck {
    pub fn new(prop: impl Into<String>, expected: impl Into<String>) -> Self {
        let prop = prop.into();
        Self {
            name: format!("scm-property-{}", prop.replace(':', "-")),
            prop,
            expected: expected.into(),
        }
    }

    /// Canned wrapper: source files must have `svn:eol-style=LF`.
    pub fn eol_style_lf() -> Self {
        Self::new("svn:eol-style", "LF")
    }
}

#[async_trait]
impl Check for ScmPropertyCheck {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &ChangeContext) -> Result<Vec<ResultItem>, CheckError> {
        if ctx.scm != ScmKind::Svn {
            return Ok(Vec::new());
        }
        let bad: Vec<String> = ctx
            .source_files()
            .filter(|f| f.property(&self.prop) != Some(self.expected.as_str()))
            .map(|f| f.path.clone())
            .collect();
        if bad.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![ResultItem::with_items(
                self.name(),
                Severity::Error,
                format!("Run the command: svn pset {} {} \\", self.prop, self.expected),
                bad,
            )])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::change::{AffectedFile, FileAction};
    use std::collections::BTreeMap;

    fn file(path: &str, props: &[(&str, &str)]) -> AffectedFile {
        AffectedFile {
            path: path.into(),
            action: FileAction::Modify,
            is_directory: false,
            content: Some("content\n".into()),
            properties: props
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn ctx(scm: ScmKind, files: Vec<AffectedFile>) -> ChangeContext {
        ChangeContext::new(
            "desc".into(),
            files,
            scm,
            None,
            None,
            true,
            false,
            None,
            "example.com".into(),
        )
    }

    #[tokio::test]
    async fn non_svn_changes_pass() {
        let results = ScmPropertyCheck::eol_style_lf()
            .run(&ctx(ScmKind::Git, vec![file("a.rs", &[])]))
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn missing_property_errors_with_fix_command() {
        let results = ScmPropertyCheck::eol_style_lf()
            .run(&ctx(
                ScmKind::Svn,
                vec![
                    file("good.cc", &[("svn:eol-style", "LF")]),
                    file("bad.cc", &[]),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        match &results[0] {
            ResultItem::Finding { severity, message, items, .. } => {
                assert_eq!(*severity, Severity::Error);
                assert!(message.contains("svn pset svn:eol-style LF"));
                assert_eq!(items, &["bad.cc"]);
            }
            other => panic!("unexpected item: {other:?}"),
        }
    }
}
