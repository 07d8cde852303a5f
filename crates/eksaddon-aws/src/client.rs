//! EKS API capabilities
//!
//! The lifecycle code never talks to a concrete SDK. It is handed typed
//! capabilities instead: [`LookupClient`] to find an addon, [`TaggingClient`]
//! to mutate tags, and [`EksApi`] for everything else the resource needs.

use async_trait::async_trait;
use eksaddon_core::{Addon, ResolveConflicts, Tags};
use std::collections::BTreeSet;

use crate::error::Result;

/// Find an addon by its natural key
#[async_trait]
pub trait LookupClient: Send + Sync {
    /// Returns `AddonNotFound`/`ClusterNotFound` when it does not exist
    async fn find_addon(&self, cluster_name: &str, addon_name: &str) -> Result<Addon>;
}

/// Mutate tags on a resource addressed by ARN
#[async_trait]
pub trait TaggingClient: Send + Sync {
    /// Set or overwrite the given tags
    async fn tag_resource(&self, arn: &str, tags: &Tags) -> Result<()>;

    /// Remove the given tag keys
    async fn untag_resource(&self, arn: &str, keys: &BTreeSet<String>) -> Result<()>;
}

/// Input for CreateAddon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAddonRequest {
    pub cluster_name: String,
    pub addon_name: String,
    pub addon_version: Option<String>,
    pub resolve_conflicts: Option<ResolveConflicts>,
    pub service_account_role_arn: Option<String>,
    pub tags: Tags,
}

/// Input for UpdateAddon; unset fields are left unchanged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateAddonRequest {
    pub cluster_name: String,
    pub addon_name: String,
    pub addon_version: Option<String>,
    pub resolve_conflicts: Option<ResolveConflicts>,
    pub service_account_role_arn: Option<String>,
}

impl UpdateAddonRequest {
    pub fn new(cluster_name: impl Into<String>, addon_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            addon_name: addon_name.into(),
            addon_version: None,
            resolve_conflicts: None,
            service_account_role_arn: None,
        }
    }

    /// True when the request would not change anything
    pub fn is_empty(&self) -> bool {
        self.addon_version.is_none()
            && self.resolve_conflicts.is_none()
            && self.service_account_role_arn.is_none()
    }
}

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Token for the next page; `None` on the last page
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }
}

/// Everything the addon lifecycle needs from EKS
#[async_trait]
pub trait EksApi: LookupClient + TaggingClient {
    async fn create_addon(&self, request: &CreateAddonRequest) -> Result<Addon>;

    async fn update_addon(&self, request: &UpdateAddonRequest) -> Result<Addon>;

    async fn delete_addon(&self, cluster_name: &str, addon_name: &str) -> Result<()>;

    async fn list_clusters(&self, next_token: Option<String>) -> Result<Page<String>>;

    async fn list_addons(
        &self,
        cluster_name: &str,
        next_token: Option<String>,
    ) -> Result<Page<String>>;
}

#[async_trait]
impl<T: LookupClient + ?Sized> LookupClient for std::sync::Arc<T> {
    async fn find_addon(&self, cluster_name: &str, addon_name: &str) -> Result<Addon> {
        (**self).find_addon(cluster_name, addon_name).await
    }
}

#[async_trait]
impl<T: TaggingClient + ?Sized> TaggingClient for std::sync::Arc<T> {
    async fn tag_resource(&self, arn: &str, tags: &Tags) -> Result<()> {
        (**self).tag_resource(arn, tags).await
    }

    async fn untag_resource(&self, arn: &str, keys: &BTreeSet<String>) -> Result<()> {
        (**self).untag_resource(arn, keys).await
    }
}

#[async_trait]
impl<T: EksApi + ?Sized> EksApi for std::sync::Arc<T> {
    async fn create_addon(&self, request: &CreateAddonRequest) -> Result<Addon> {
        (**self).create_addon(request).await
    }

    async fn update_addon(&self, request: &UpdateAddonRequest) -> Result<Addon> {
        (**self).update_addon(request).await
    }

    async fn delete_addon(&self, cluster_name: &str, addon_name: &str) -> Result<()> {
        (**self).delete_addon(cluster_name, addon_name).await
    }

    async fn list_clusters(&self, next_token: Option<String>) -> Result<Page<String>> {
        (**self).list_clusters(next_token).await
    }

    async fn list_addons(
        &self,
        cluster_name: &str,
        next_token: Option<String>,
    ) -> Result<Page<String>> {
        (**self).list_addons(cluster_name, next_token).await
    }
}
