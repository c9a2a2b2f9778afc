//! Environment variable lookup seam.
//!
//! All env access for config overrides goes through [`Env`] so tests
//! can supply controlled values without touching the process
//! environment (`std::env::set_var` is unsafe under concurrent tests).

use std::collections::HashMap;

/// Environment variable reader.
#[derive(Clone, Debug, Default)]
pub struct Env {
    overrides: Option<HashMap<String, String>>,
}

impl Env {
    /// Reads from the real process environment.
    pub fn real() -> Self {
        Self { overrides: None }
    }

    /// Backed by explicit key-value pairs; anything not listed is absent.
    #[cfg(test)]
    pub fn mock(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            overrides: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Look up a variable; unset and non-unicode values both read as
    /// absent.
    pub fn var(&self, name: &str) -> Option<String> {
        match &self.overrides {
            Some(map) => map.get(name).cloned(),
            None => std::env::var(name).ok(),
        }
    }
}
