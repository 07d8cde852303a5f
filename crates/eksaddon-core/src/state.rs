//! Persisted resource state

use serde::{Deserialize, Serialize};

use crate::addon::{Addon, ResolveConflicts};
use crate::error::Result;
use crate::id::AddonId;
use crate::tags::Tags;

/// State recorded for a managed addon after each lifecycle operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonState {
    pub id: AddonId,
    pub arn: String,
    pub cluster_name: String,
    pub addon_name: String,
    pub addon_version: String,

    /// Only known when the addon was created or updated through us
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_conflicts: Option<ResolveConflicts>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_role_arn: Option<String>,

    /// Resource-level tags
    #[serde(default)]
    pub tags: Tags,

    /// Effective tags (defaults included, ignored keys excluded)
    #[serde(default)]
    pub tags_all: Tags,
}

impl AddonState {
    /// Build state from a remote addon and the tag views computed for it
    pub fn from_remote(
        addon: &Addon,
        resolve_conflicts: Option<ResolveConflicts>,
        tags: Tags,
        tags_all: Tags,
    ) -> Result<Self> {
        Ok(Self {
            id: addon.id()?,
            arn: addon.arn.clone(),
            cluster_name: addon.cluster_name.clone(),
            addon_name: addon.addon_name.clone(),
            addon_version: addon.addon_version.clone(),
            resolve_conflicts,
            service_account_role_arn: addon.service_account_role_arn.clone(),
            tags,
            tags_all,
        })
    }

    /// Compare two states the way an import verification does.
    ///
    /// `resolve_conflicts` is write-only on the EKS side and is skipped.
    pub fn matches_imported(&self, imported: &AddonState) -> bool {
        self.id == imported.id
            && self.arn == imported.arn
            && self.addon_version == imported.addon_version
            && self.service_account_role_arn == imported.service_account_role_arn
            && self.tags == imported.tags
            && self.tags_all == imported.tags_all
    }
}
