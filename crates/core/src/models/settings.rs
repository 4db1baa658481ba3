use serde::{Deserialize, Serialize};

use super::record::SOURCE_COUNT;
use crate::errors::CoreError;

/// Key under which the whole store is persisted.
pub const DEFAULT_STORAGE_KEY: &str = "incomeData";

/// Host-supplied configuration: targets, source display names, storage key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Income a single day should reach (default 15).
    pub daily_target: f64,

    /// Income a calendar month should reach (default 450).
    pub monthly_target: f64,

    /// Display names of the income sources, in amount order.
    /// Used as column headers in tabular exports.
    pub source_names: [String; SOURCE_COUNT],

    /// Key the record blob is stored under in the key-value store.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            daily_target: 15.0,
            monthly_target: 450.0,
            source_names: [
                "Ava".to_string(),
                "Skip STTC".to_string(),
                "ROA Gather".to_string(),
            ],
            storage_key: default_storage_key(),
        }
    }
}

impl Settings {
    /// Reject targets that would make progress and status meaningless.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, target) in [
            ("daily_target", self.daily_target),
            ("monthly_target", self.monthly_target),
        ] {
            if !target.is_finite() || target <= 0.0 {
                return Err(CoreError::InvalidSettings(format!(
                    "{name} must be a positive number, got {target}"
                )));
            }
        }
        if let Some(idx) = self.source_names.iter().position(|n| n.trim().is_empty()) {
            return Err(CoreError::InvalidSettings(format!(
                "source name #{} must not be blank",
                idx + 1
            )));
        }
        if self.storage_key.trim().is_empty() {
            return Err(CoreError::InvalidSettings(
                "storage_key must not be blank".into(),
            ));
        }
        Ok(())
    }
}
