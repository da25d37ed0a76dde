//! Label configuration: allow-list and display names.

use serde::{Deserialize, Serialize};

use crate::domain::error::{ReleaseError, Result};

/// Case-insensitive label name comparison.
pub(crate) fn same_label(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Configuration of a single tracker label.
///
/// Identity is the case-insensitive `name`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelConfig {
    /// Label name as defined in the tracker.
    #[serde(alias = "Name")]
    pub name: String,

    /// Heading used in release notes. Falls back to `name`.
    #[serde(default, alias = "DisplayName")]
    pub display_name: Option<String>,
}

impl LabelConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

impl PartialEq for LabelConfig {
    fn eq(&self, other: &Self) -> bool {
        same_label(&self.name, &other.name)
    }
}

impl Eq for LabelConfig {}

/// Which labels make it into release notes, and how they are shown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelsPolicy {
    /// Allow-list of label names. Empty allows every label.
    #[serde(default, alias = "Include")]
    pub include: Vec<String>,

    /// Per-label configuration, unique by case-insensitive name.
    #[serde(default, alias = "Configs")]
    pub configs: Vec<LabelConfig>,
}

impl LabelsPolicy {
    pub fn should_include(&self, label: &str) -> bool {
        self.include.is_empty() || self.include.iter().any(|l| same_label(l, label))
    }

    /// Configuration for `label`, or a default one carrying the raw name.
    pub fn resolve(&self, label: &str) -> LabelConfig {
        self.configs
            .iter()
            .find(|config| same_label(&config.name, label))
            .cloned()
            .unwrap_or_else(|| LabelConfig::new(label))
    }

    /// Rejects duplicate label configurations.
    pub fn ensure_valid(&self) -> Result<()> {
        for (i, config) in self.configs.iter().enumerate() {
            if self.configs[..i]
                .iter()
                .any(|earlier| same_label(&earlier.name, &config.name))
            {
                return Err(ReleaseError::Configuration(format!(
                    "found multiple label configurations of {}",
                    config.name
                )));
            }
        }
        Ok(())
    }
}
