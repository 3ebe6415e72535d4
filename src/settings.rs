//! Plugin settings and their form description.
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, SettingsStore};

/// Persisted plugin settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub my_setting: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            my_setting: "default".to_string(),
        }
    }
}

/// Describes a free-text field on the settings form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsField {
    pub name: &'static str,
    pub description: &'static str,
    pub placeholder: &'static str,
}

pub const MY_SETTING_FIELD: SettingsField = SettingsField {
    name: "Setting #1",
    description: "It's a secret",
    placeholder: "Enter your secret",
};

impl Settings {
    /// Loads settings, merging whatever was stored over the defaults.
    pub fn load(store: &dyn SettingsStore) -> Result<Self> {
        let settings = match store.load()? {
            Some(data) => Self::merge_over_defaults(data),
            None => {
                debug!("No stored settings, using defaults");
                Self::default()
            }
        };

        Ok(settings)
    }

    pub fn save(&self, store: &dyn SettingsStore) -> Result<()> {
        store.save(&serde_json::to_value(self)?)
    }

    fn merge_over_defaults(data: Value) -> Self {
        let mut merged = match serde_json::to_value(Self::default()) {
            Ok(Value::Object(defaults)) => defaults,
            _ => return Self::default(),
        };

        match data {
            Value::Object(stored) => merged.extend(stored),
            other => warn!("Ignoring stored settings that are not an object: {}", other),
        }

        serde_json::from_value(Value::Object(merged)).unwrap_or_else(|e| {
            warn!("Stored settings are invalid, using defaults: {}", e);
            Self::default()
        })
    }
}
