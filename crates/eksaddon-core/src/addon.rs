//! Addon configuration and remote representation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::arn::validate_role_arn;
use crate::error::{CoreError, Result};
use crate::id::AddonId;
use crate::tags::{Tags, validate_tags};

/// How EKS resolves conflicts with existing self-managed configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResolveConflicts {
    None,
    Overwrite,
}

impl std::fmt::Display for ResolveConflicts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::None => "NONE",
            Self::Overwrite => "OVERWRITE",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ResolveConflicts {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NONE" => Ok(Self::None),
            "OVERWRITE" => Ok(Self::Overwrite),
            other => Err(CoreError::invalid_input(
                "resolve_conflicts",
                format!("expected NONE or OVERWRITE, got '{}'", other),
            )),
        }
    }
}

/// Addon lifecycle status as reported by EKS
///
/// Note: This enum is non-exhaustive - EKS may report new statuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum AddonStatus {
    Creating,
    #[default]
    Active,
    CreateFailed,
    Updating,
    Deleting,
    DeleteFailed,
    Degraded,
}

impl std::fmt::Display for AddonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Creating => "CREATING",
            Self::Active => "ACTIVE",
            Self::CreateFailed => "CREATE_FAILED",
            Self::Updating => "UPDATING",
            Self::Deleting => "DELETING",
            Self::DeleteFailed => "DELETE_FAILED",
            Self::Degraded => "DEGRADED",
        };
        write!(f, "{}", s)
    }
}

/// Parse an EKS addon version (`v1.8.0-eksbuild.1`)
pub fn parse_addon_version(version: &str) -> Result<semver::Version> {
    let bare = version
        .strip_prefix('v')
        .ok_or_else(|| CoreError::InvalidVersion {
            version: version.to_string(),
            reason: "must start with 'v'".to_string(),
        })?;

    semver::Version::parse(bare).map_err(|e| CoreError::InvalidVersion {
        version: version.to_string(),
        reason: e.to_string(),
    })
}

/// Desired addon configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonSpec {
    pub cluster_name: String,

    pub addon_name: String,

    /// Pinned version; EKS picks the default version when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addon_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_conflicts: Option<ResolveConflicts>,

    /// IAM role bound to the addon's service account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_role_arn: Option<String>,

    /// Resource-level tags
    #[serde(default)]
    pub tags: Tags,
}

impl AddonSpec {
    pub fn new(cluster_name: impl Into<String>, addon_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            addon_name: addon_name.into(),
            addon_version: None,
            resolve_conflicts: None,
            service_account_role_arn: None,
            tags: Tags::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.addon_version = Some(version.into());
        self
    }

    pub fn with_resolve_conflicts(mut self, resolve: ResolveConflicts) -> Self {
        self.resolve_conflicts = Some(resolve);
        self
    }

    pub fn with_service_account_role_arn(mut self, arn: impl Into<String>) -> Self {
        self.service_account_role_arn = Some(arn.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Resource identifier derived from the cluster and addon names
    pub fn id(&self) -> Result<AddonId> {
        AddonId::new(&self.cluster_name, &self.addon_name)
    }

    /// Validate the spec on its own (no provider policy involved)
    pub fn validate(&self) -> Result<()> {
        self.id()?;

        if let Some(version) = &self.addon_version {
            parse_addon_version(version)?;
        }
        if let Some(arn) = &self.service_account_role_arn {
            validate_role_arn(arn)?;
        }
        validate_tags(&self.tags)
    }

    /// Load a spec from a YAML (or JSON) file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Addon as described by the EKS API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Addon {
    pub arn: String,
    pub cluster_name: String,
    pub addon_name: String,
    pub addon_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_role_arn: Option<String>,
    pub status: AddonStatus,
    #[serde(default)]
    pub tags: Tags,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Addon {
    pub fn id(&self) -> Result<AddonId> {
        AddonId::new(&self.cluster_name, &self.addon_name)
    }
}
