//! Container settings.
//!
//! Settings are plain serde data, so an application can keep its aliases
//! and bindings next to the rest of its configuration:
//!
//! ```json
//! {
//!     "max_depth": 32,
//!     "aliases": { "mailer": "app::SmtpMailer" },
//!     "bindings": [
//!         { "id": "smtp", "target": "app::SmtpTransport", "arguments": ["mail.local", 25] }
//!     ]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ContainerError, Result};
use crate::value::Value;

/// Resolution depth used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// Longest resolution stack allowed before failing with `DepthExceeded`.
    /// Counts the requested identifier itself, so it must be at least 1.
    pub max_depth: usize,
    /// Allow a component to replace one registered under the same identifier.
    pub allow_override: bool,
    /// Run dependency graph validation in `ContainerBuilder::build`.
    pub validate_on_build: bool,
    /// Alias → target.
    pub aliases: BTreeMap<String, String>,
    pub bindings: Vec<BindingSettings>,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            allow_override: false,
            validate_on_build: true,
            aliases: BTreeMap::new(),
            bindings: Vec::new(),
        }
    }
}

impl ContainerSettings {
    /// # Errors
    /// [`ContainerError::InvalidSettings`] when `max_depth` is 0.
    pub fn check(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(ContainerError::InvalidSettings(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One configured binding; see `Container::bind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingSettings {
    pub id: String,
    pub target: String,
    #[serde(default)]
    pub arguments: Vec<Value>,
    #[serde(default)]
    pub renew: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let settings: ContainerSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, ContainerSettings::default());
        assert_eq!(settings.max_depth, DEFAULT_MAX_DEPTH);
        assert!(settings.validate_on_build);
    }

    #[test]
    fn zero_depth_is_rejected() {
        let settings: ContainerSettings = serde_json::from_str(r#"{ "max_depth": 0 }"#).unwrap();
        assert!(matches!(settings.check(), Err(ContainerError::InvalidSettings(_))));
        assert!(ContainerSettings::default().check().is_ok());
    }

    #[test]
    fn parses_aliases_and_bindings() {
        let settings: ContainerSettings = serde_json::from_str(
            r#"{
                "max_depth": 8,
                "aliases": { "mailer": "smtp" },
                "bindings": [
                    {
                        "id": "smtp",
                        "target": "app::Smtp",
                        "arguments": ["mail.local", 25],
                        "renew": true
                    },
                    { "id": "log", "target": "app::Log" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(settings.max_depth, 8);
        assert_eq!(settings.aliases["mailer"], "smtp");
        assert_eq!(settings.bindings.len(), 2);
        assert_eq!(
            settings.bindings[0].arguments,
            vec![Value::Str("mail.local".into()), Value::Int(25)]
        );
        assert!(settings.bindings[0].renew);
        assert!(settings.bindings[1].arguments.is_empty());
        assert!(!settings.bindings[1].renew);
    }
}
