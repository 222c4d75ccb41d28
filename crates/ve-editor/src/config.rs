//! Editor configuration.
//!
//! Every field has a default, so a partial JSON object (or `{}`) is a valid
//! config.

use crate::error::EditorResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the editor is running. Saving only ever happens in the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Browser,
    Test,
}

/// What to do when an action batch leaves duplicate UIDs in the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateUidPolicy {
    /// Log, show a persistent "please reload" toast, and carry on.
    #[default]
    Toast,
    /// Abort the dispatch and leave the store untouched.
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Canvas px the pointer must travel before a drag session starts.
    pub drag_threshold: f64,

    /// Idle time after which a keyboard session is committed and cleared.
    pub keyboard_interaction_timeout_ms: u64,

    /// Cap on undo entries. Oldest entries are dropped first; `null`
    /// removes the cap. Default: **200**.
    pub history_limit: Option<usize>,

    pub environment: Environment,

    pub duplicate_uid_policy: DuplicateUidPolicy,

    /// Added to the fitness of any positive strategy offered for an ancestor.
    pub ancestor_fitness_boost: f64,

    /// Register the ancestor meta-strategy. Default: **true**.
    pub ancestor_bubbling: bool,
}

pub const DEFAULT_HISTORY_LIMIT: usize = 200;

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 2.0,
            keyboard_interaction_timeout_ms: 600,
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
            environment: Environment::Browser,
            duplicate_uid_policy: DuplicateUidPolicy::Toast,
            ancestor_fitness_boost: 10.0,
            ancestor_bubbling: true,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> EditorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Test environment with the strict duplicate-UID policy.
    pub fn for_tests() -> Self {
        Self {
            environment: Environment::Test,
            duplicate_uid_policy: DuplicateUidPolicy::Error,
            ..Self::default()
        }
    }

    pub fn keyboard_timeout(&self) -> Duration {
        Duration::from_millis(self.keyboard_interaction_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_json_is_default() {
        assert_eq!(EditorConfig::from_json("{}").unwrap(), EditorConfig::default());
    }

    #[test]
    fn partial_json_overrides() {
        let config = EditorConfig::from_json(
            r#"{ "drag_threshold": 4.0, "environment": "test", "history_limit": 50 }"#,
        )
        .unwrap();
        assert_eq!(config.drag_threshold, 4.0);
        assert_eq!(config.environment, Environment::Test);
        assert_eq!(config.history_limit, Some(50));
        assert_eq!(config.keyboard_timeout(), Duration::from_millis(600));
    }

    #[test]
    fn history_is_capped_unless_disabled() {
        assert_eq!(EditorConfig::default().history_limit, Some(DEFAULT_HISTORY_LIMIT));
        let uncapped = EditorConfig::from_json(r#"{ "history_limit": null }"#).unwrap();
        assert_eq!(uncapped.history_limit, None);
    }

    #[test]
    fn bad_json_is_a_config_error() {
        assert!(matches!(
            EditorConfig::from_json("{ drag_threshold: }"),
            Err(crate::error::EditorError::Config(_))
        ));
    }
}
