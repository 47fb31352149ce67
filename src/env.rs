//! Environment variable abstraction for testability.
//!
//! Production code uses [`Env::real()`] which delegates to [`std::env::var`].
//! Tests use [`Env::mock()`] backed by a `HashMap`, so config resolution can
//! be exercised without touching the process environment.

use std::collections::HashMap;

/// Environment variable reader.
#[derive(Clone, Debug)]
pub struct Env {
    overrides: Option<HashMap<String, String>>,
}

impl Env {
    /// Create an `Env` that reads from the real process environment.
    pub fn real() -> Self {
        Self { overrides: None }
    }

    /// Create an `Env` backed by explicit key-value pairs.
    pub fn mock(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            overrides: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Look up an environment variable by name.
    ///
    /// Empty values are treated as absent.
    pub fn var(&self, name: &str) -> Option<String> {
        let value = match &self.overrides {
            Some(map) => map.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.filter(|v| !v.is_empty())
    }

    /// Return the first variable in `names` that is set.
    pub fn first_of(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| self.var(name))
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::real()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_env_reads_cargo_manifest_dir() {
        let env = Env::real();
        assert!(env.var("CARGO_MANIFEST_DIR").is_some());
    }

    #[test]
    fn mock_env_returns_set_values() {
        let env = Env::mock([("DIFFTHREAD_TOKEN", "ghp_x"), ("GITHUB_TOKEN", "ghp_y")]);
        assert_eq!(env.var("DIFFTHREAD_TOKEN").as_deref(), Some("ghp_x"));
        assert_eq!(env.var("GITHUB_TOKEN").as_deref(), Some("ghp_y"));
        assert!(env.var("NONEXISTENT").is_none());
    }

    #[test]
    fn empty_values_count_as_missing() {
        let env = Env::mock([("DIFFTHREAD_TOKEN", "")]);
        assert!(env.var("DIFFTHREAD_TOKEN").is_none());
    }

    #[test]
    fn first_of_respects_order() {
        let env = Env::mock([("GITHUB_TOKEN", "fallback")]);
        assert_eq!(
            env.first_of(&["DIFFTHREAD_TOKEN", "GITHUB_TOKEN"]).as_deref(),
            Some("fallback")
        );

        let env = Env::mock([("DIFFTHREAD_TOKEN", "primary"), ("GITHUB_TOKEN", "fallback")]);
        assert_eq!(
            env.first_of(&["DIFFTHREAD_TOKEN", "GITHUB_TOKEN"]).as_deref(),
            Some("primary")
        );
    }
}
