//! Provider configuration
//!
//! Stored in `~/.config/eksaddon/provider.yaml`:
//!
//! ```yaml
//! region: us-west-2
//! defaultTags:
//!   tags:
//!     team: platform
//! ignoreTags:
//!   keys: [LastScanned]
//!   keyPrefixes: ["kubernetes.io/"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::tags::{IgnoreTags, TagPolicy, Tags, validate_tags};

/// Provider-wide settings shared by every managed addon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default = "default_partition")]
    pub partition: String,

    #[serde(default)]
    pub default_tags: DefaultTags,

    #[serde(default)]
    pub ignore_tags: IgnoreTags,
}

/// Tags applied to every resource managed by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultTags {
    #[serde(default)]
    pub tags: Tags,
}

fn default_partition() -> String {
    "aws".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            region: None,
            partition: default_partition(),
            default_tags: DefaultTags::default(),
            ignore_tags: IgnoreTags::default(),
        }
    }
}

impl ProviderConfig {
    /// Load configuration from the default location, or defaults if absent
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default configuration path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| CoreError::InvalidConfig {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("eksaddon").join("provider.yaml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.partition.is_empty() {
            return Err(CoreError::InvalidConfig {
                message: "partition must not be empty".to_string(),
            });
        }
        if self.ignore_tags.key_prefixes.iter().any(String::is_empty) {
            return Err(CoreError::InvalidConfig {
                message: "ignoreTags.keyPrefixes must not contain an empty prefix".to_string(),
            });
        }
        validate_tags(&self.default_tags.tags)
    }

    /// Tag policy handed to reconciliation
    pub fn tag_policy(&self) -> TagPolicy {
        TagPolicy::new(self.default_tags.tags.clone(), self.ignore_tags.clone())
    }
}
