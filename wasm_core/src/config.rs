//! Startup configuration handed over by the JS host as a JSON object.
//!
//! Every field is optional; anything omitted falls back to the defaults below.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cache::{CachePolicy, default_policies};
use crate::error::{Result, ToolError};
use crate::search::SearchOptions;

pub const DEFAULT_STORAGE_PREFIX: &str = "toolbox";

/// Sub-namespace for user preferences. Cache entries sit next to it under
/// `<prefix>:cache`, so neither side ever lists or purges the other's keys.
pub const PREFERENCES_NAMESPACE: &str = "prefs";

/// Storage prefix for preference entries; blank input uses the default prefix.
pub fn preferences_prefix(storage_prefix: &str) -> String {
    let base = match storage_prefix.trim() {
        "" => DEFAULT_STORAGE_PREFIX,
        other => other,
    };
    format!("{base}:{PREFERENCES_NAMESPACE}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolkitConfig {
    pub storage_prefix: String,
    /// Bumped by the host whenever cached payload shapes change.
    pub cache_version: u32,
    pub cache_policies: BTreeMap<String, CachePolicy>,
    pub search: SearchOptions,
    pub log_level: String,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            storage_prefix: DEFAULT_STORAGE_PREFIX.into(),
            cache_version: 1,
            cache_policies: default_policies(),
            search: SearchOptions::default(),
            log_level: "info".into(),
        }
    }
}

impl ToolkitConfig {
    /// Parses and validates a config document. Blank input means defaults.
    pub fn from_json(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ToolkitConfig = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage_prefix.trim().is_empty() {
            return Err(ToolError::invalid("storagePrefix cannot be empty"));
        }
        if !(0.0..=1.0).contains(&self.search.threshold) {
            return Err(ToolError::invalid("search threshold must be between 0 and 1"));
        }
        for (name, policy) in &self.cache_policies {
            if name.is_empty() || name.contains(':') {
                return Err(ToolError::invalid(format!("invalid cache policy name '{name}'")));
            }
            if policy.max_entries == 0 {
                return Err(ToolError::invalid(format!(
                    "cache policy {name} must allow at least one entry"
                )));
            }
        }
        Ok(())
    }

    pub fn preferences_prefix(&self) -> String {
        preferences_prefix(&self.storage_prefix)
    }

    pub fn log_level(&self) -> log::Level {
        parse_log_level(&self.log_level)
    }
}

/// Unknown names fall back to `info`.
pub fn parse_log_level(level: &str) -> log::Level {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => log::Level::Trace,
        "debug" => log::Level::Debug,
        "warn" => log::Level::Warn,
        "error" => log::Level::Error,
        _ => log::Level::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_yields_defaults() {
        let config = ToolkitConfig::from_json("  ").unwrap();
        assert_eq!(config, ToolkitConfig::default());
        assert!(config.cache_policies.contains_key("default"));
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = ToolkitConfig::from_json(
            r#"{"storagePrefix":"tools","search":{"threshold":0.5},"logLevel":"debug"}"#,
        )
        .unwrap();
        assert_eq!(config.storage_prefix, "tools");
        assert_eq!(config.search.threshold, 0.5);
        assert_eq!(config.search.weights.name, 0.4);
        assert_eq!(config.log_level(), log::Level::Debug);
        assert_eq!(config.cache_version, 1);
    }

    #[test]
    fn custom_policies_replace_defaults() {
        let config = ToolkitConfig::from_json(
            r#"{"cachePolicies":{"rates":{"maxAgeMs":1000,"maxEntries":5}}}"#,
        )
        .unwrap();
        let rates = config.cache_policies.get("rates").unwrap();
        assert_eq!(rates.stale_while_revalidate_ms, 0);
        assert_eq!(config.cache_policies.len(), 1);
    }

    #[test]
    fn preferences_get_their_own_namespace() {
        assert_eq!(preferences_prefix(""), "toolbox:prefs");
        assert_eq!(preferences_prefix(" app "), "app:prefs");
        let config = ToolkitConfig::from_json(r#"{"storagePrefix":"tools"}"#).unwrap();
        assert_eq!(config.preferences_prefix(), "tools:prefs");
    }

    #[test]
    fn invalid_documents_are_rejected() {
        assert!(matches!(
            ToolkitConfig::from_json("{"),
            Err(ToolError::Json { .. })
        ));
        assert!(ToolkitConfig::from_json(r#"{"search":{"threshold":2}}"#).is_err());
        assert!(
            ToolkitConfig::from_json(r#"{"cachePolicies":{"a:b":{"maxAgeMs":1,"maxEntries":1}}}"#)
                .is_err()
        );
    }
}
