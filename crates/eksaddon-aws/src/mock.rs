//! In-memory EKS backend for testing
//!
//! Keeps clusters and their addons in memory, paginates listings with a
//! configurable page size, records every tagging call in order and can be
//! told to fail tagging, listing or delete calls.

use async_trait::async_trait;
use chrono::Utc;
use eksaddon_core::{Addon, AddonArn, AddonStatus, Tags};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use crate::client::{
    CreateAddonRequest, EksApi, LookupClient, Page, TaggingClient, UpdateAddonRequest,
};
use crate::error::{AwsError, Result};

/// Version assigned when a create request does not pin one
pub const DEFAULT_ADDON_VERSION: &str = "v1.10.1-eksbuild.1";

type ClusterMap = BTreeMap<String, BTreeMap<String, Addon>>;

/// In-memory EKS client for testing
#[derive(Clone)]
pub struct MockEksClient {
    /// Storage: cluster -> addon name -> addon
    clusters: Arc<RwLock<ClusterMap>>,
    operations: Arc<RwLock<OperationCounts>>,
    tag_log: Arc<RwLock<Vec<TagCall>>>,
    faults: Arc<RwLock<Faults>>,
    partition: String,
    region: String,
    account_id: String,
    page_size: usize,
}

/// Counts of API calls for testing assertions
#[derive(Debug, Default, Clone)]
pub struct OperationCounts {
    pub describes: usize,
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
    pub lists: usize,
    pub tags: usize,
    pub untags: usize,
}

/// A recorded tagging call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagCall {
    Tag { arn: String, tags: Tags },
    Untag { arn: String, keys: BTreeSet<String> },
}

#[derive(Debug, Default)]
struct Faults {
    tagging: Option<String>,
    list_addons: HashMap<String, String>,
    /// Offset from which cluster listing pages fail
    list_clusters: Option<(usize, String)>,
    deletes: HashMap<(String, String), String>,
}

impl MockEksClient {
    /// Create an empty backend in `us-west-2`
    pub fn new() -> Self {
        Self {
            clusters: Arc::new(RwLock::new(BTreeMap::new())),
            operations: Arc::new(RwLock::new(OperationCounts::default())),
            tag_log: Arc::new(RwLock::new(Vec::new())),
            faults: Arc::new(RwLock::new(Faults::default())),
            partition: "aws".to_string(),
            region: "us-west-2".to_string(),
            account_id: "123456789012".to_string(),
            page_size: 100,
        }
    }

    /// Add a cluster with no addons
    pub fn with_cluster(self, name: &str) -> Self {
        self.add_cluster(name);
        self
    }

    /// Set the maximum number of items per listing page
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_region(mut self, region: &str) -> Self {
        self.region = region.to_string();
        self
    }

    pub fn add_cluster(&self, name: &str) {
        let mut clusters = self.clusters.write().unwrap();
        clusters.entry(name.to_string()).or_default();
    }

    /// Delete a cluster and all of its addons behind the lifecycle's back
    pub fn remove_cluster(&self, name: &str) -> bool {
        let mut clusters = self.clusters.write().unwrap();
        clusters.remove(name).is_some()
    }

    /// Delete an addon behind the lifecycle's back
    pub fn remove_addon(&self, cluster_name: &str, addon_name: &str) -> bool {
        let mut clusters = self.clusters.write().unwrap();
        clusters
            .get_mut(cluster_name)
            .and_then(|addons| addons.remove(addon_name))
            .is_some()
    }

    /// Make every tagging call fail with `message`
    pub fn fail_tagging(&self, message: &str) {
        let mut faults = self.faults.write().unwrap();
        faults.tagging = Some(message.to_string());
    }

    /// Make listing the addons of `cluster_name` fail with `message`
    pub fn fail_list_addons(&self, cluster_name: &str, message: &str) {
        let mut faults = self.faults.write().unwrap();
        faults
            .list_addons
            .insert(cluster_name.to_string(), message.to_string());
    }

    /// Make cluster listing fail for every page starting at `offset`
    pub fn fail_list_clusters_from(&self, offset: usize, message: &str) {
        let mut faults = self.faults.write().unwrap();
        faults.list_clusters = Some((offset, message.to_string()));
    }

    /// Make deleting one addon fail with `message`
    pub fn fail_delete(&self, cluster_name: &str, addon_name: &str, message: &str) {
        let mut faults = self.faults.write().unwrap();
        faults.deletes.insert(
            (cluster_name.to_string(), addon_name.to_string()),
            message.to_string(),
        );
    }

    pub fn clear_faults(&self) {
        let mut faults = self.faults.write().unwrap();
        *faults = Faults::default();
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().unwrap().clone()
    }

    /// Reset operation counts and the tagging log
    pub fn reset_counts(&self) {
        *self.operations.write().unwrap() = OperationCounts::default();
        self.tag_log.write().unwrap().clear();
    }

    /// Tagging calls in the order they were made
    pub fn tag_log(&self) -> Vec<TagCall> {
        self.tag_log.read().unwrap().clone()
    }

    /// Count addons across all clusters
    pub fn addon_count(&self) -> usize {
        let clusters = self.clusters.read().unwrap();
        clusters.values().map(BTreeMap::len).sum()
    }

    fn count(&self, op: impl FnOnce(&mut OperationCounts)) {
        let mut ops = self.operations.write().unwrap();
        op(&mut ops);
    }

    fn addon_arn(&self, cluster_name: &str, addon_name: &str) -> String {
        let seed = format!(
            "{}/{}/{}",
            cluster_name,
            addon_name,
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );
        let digest = hex::encode(Sha256::digest(seed.as_bytes()));
        let suffix = format!(
            "{}-{}-{}-{}-{}",
            &digest[0..8],
            &digest[8..12],
            &digest[12..16],
            &digest[16..20],
            &digest[20..32]
        );

        AddonArn {
            partition: self.partition.clone(),
            region: self.region.clone(),
            account_id: self.account_id.clone(),
            cluster_name: cluster_name.to_string(),
            addon_name: addon_name.to_string(),
            suffix,
        }
        .to_string()
    }

    fn page<T: Clone>(&self, items: &[T], next_token: Option<String>) -> Result<Page<T>> {
        let start = page_offset(next_token)?;
        let end = start.saturating_add(self.page_size).min(items.len());
        let next_token = (end < items.len()).then(|| end.to_string());

        Ok(Page {
            items: items.get(start..end).unwrap_or_default().to_vec(),
            next_token,
        })
    }

    fn with_addon_by_arn<R>(&self, arn: &str, f: impl FnOnce(&mut Addon) -> R) -> Result<R> {
        let mut clusters = self.clusters.write().unwrap();
        clusters
            .values_mut()
            .flat_map(|addons| addons.values_mut())
            .find(|addon| addon.arn == arn)
            .map(f)
            .ok_or_else(|| {
                AwsError::api(
                    "TagResource",
                    format!("ResourceNotFoundException: no resource found for {arn}"),
                )
            })
    }

    fn tagging_fault(&self) -> Option<String> {
        self.faults.read().unwrap().tagging.clone()
    }
}

fn page_offset(next_token: Option<String>) -> Result<usize> {
    match next_token {
        None => Ok(0),
        Some(token) => token
            .parse::<usize>()
            .map_err(|_| AwsError::api("List", format!("invalid pagination token '{token}'"))),
    }
}

impl Default for MockEksClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LookupClient for MockEksClient {
    async fn find_addon(&self, cluster_name: &str, addon_name: &str) -> Result<Addon> {
        self.count(|ops| ops.describes += 1);

        let clusters = self.clusters.read().unwrap();
        let addons = clusters
            .get(cluster_name)
            .ok_or_else(|| AwsError::ClusterNotFound {
                cluster: cluster_name.to_string(),
            })?;
        addons
            .get(addon_name)
            .cloned()
            .ok_or_else(|| AwsError::AddonNotFound {
                cluster: cluster_name.to_string(),
                addon: addon_name.to_string(),
            })
    }
}

#[async_trait]
impl TaggingClient for MockEksClient {
    async fn tag_resource(&self, arn: &str, tags: &Tags) -> Result<()> {
        self.count(|ops| ops.tags += 1);
        if let Some(message) = self.tagging_fault() {
            return Err(AwsError::api("TagResource", message));
        }

        self.with_addon_by_arn(arn, |addon| {
            addon
                .tags
                .extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        })?;
        self.tag_log.write().unwrap().push(TagCall::Tag {
            arn: arn.to_string(),
            tags: tags.clone(),
        });
        Ok(())
    }

    async fn untag_resource(&self, arn: &str, keys: &BTreeSet<String>) -> Result<()> {
        self.count(|ops| ops.untags += 1);
        if let Some(message) = self.tagging_fault() {
            return Err(AwsError::api("UntagResource", message));
        }

        self.with_addon_by_arn(arn, |addon| {
            addon.tags.retain(|k, _| !keys.contains(k));
        })?;
        self.tag_log.write().unwrap().push(TagCall::Untag {
            arn: arn.to_string(),
            keys: keys.clone(),
        });
        Ok(())
    }
}

#[async_trait]
impl EksApi for MockEksClient {
    async fn create_addon(&self, request: &CreateAddonRequest) -> Result<Addon> {
        self.count(|ops| ops.creates += 1);
        let arn = self.addon_arn(&request.cluster_name, &request.addon_name);

        let mut clusters = self.clusters.write().unwrap();
        let addons = clusters
            .get_mut(&request.cluster_name)
            .ok_or_else(|| AwsError::ClusterNotFound {
                cluster: request.cluster_name.clone(),
            })?;

        if addons.contains_key(&request.addon_name) {
            return Err(AwsError::AddonAlreadyExists {
                cluster: request.cluster_name.clone(),
                addon: request.addon_name.clone(),
            });
        }

        let now = Utc::now();
        let addon = Addon {
            arn,
            cluster_name: request.cluster_name.clone(),
            addon_name: request.addon_name.clone(),
            addon_version: request
                .addon_version
                .clone()
                .unwrap_or_else(|| DEFAULT_ADDON_VERSION.to_string()),
            service_account_role_arn: request.service_account_role_arn.clone(),
            status: AddonStatus::Active,
            tags: request.tags.clone(),
            created_at: now,
            modified_at: now,
        };
        addons.insert(request.addon_name.clone(), addon.clone());

        Ok(addon)
    }

    async fn update_addon(&self, request: &UpdateAddonRequest) -> Result<Addon> {
        self.count(|ops| ops.updates += 1);

        let mut clusters = self.clusters.write().unwrap();
        let addon = clusters
            .get_mut(&request.cluster_name)
            .ok_or_else(|| AwsError::ClusterNotFound {
                cluster: request.cluster_name.clone(),
            })?
            .get_mut(&request.addon_name)
            .ok_or_else(|| AwsError::AddonNotFound {
                cluster: request.cluster_name.clone(),
                addon: request.addon_name.clone(),
            })?;

        if let Some(version) = &request.addon_version {
            addon.addon_version = version.clone();
        }
        if let Some(role) = &request.service_account_role_arn {
            addon.service_account_role_arn = Some(role.clone());
        }
        addon.status = AddonStatus::Active;
        addon.modified_at = Utc::now();

        Ok(addon.clone())
    }

    async fn delete_addon(&self, cluster_name: &str, addon_name: &str) -> Result<()> {
        self.count(|ops| ops.deletes += 1);

        let key = (cluster_name.to_string(), addon_name.to_string());
        if let Some(message) = self.faults.read().unwrap().deletes.get(&key) {
            return Err(AwsError::api("DeleteAddon", message.clone()));
        }

        let mut clusters = self.clusters.write().unwrap();
        clusters
            .get_mut(cluster_name)
            .ok_or_else(|| AwsError::ClusterNotFound {
                cluster: cluster_name.to_string(),
            })?
            .remove(addon_name)
            .map(|_| ())
            .ok_or_else(|| AwsError::AddonNotFound {
                cluster: cluster_name.to_string(),
                addon: addon_name.to_string(),
            })
    }

    async fn list_clusters(&self, next_token: Option<String>) -> Result<Page<String>> {
        self.count(|ops| ops.lists += 1);

        if let Some((from, message)) = &self.faults.read().unwrap().list_clusters {
            if page_offset(next_token.clone())? >= *from {
                return Err(AwsError::api("ListClusters", message.clone()));
            }
        }

        let names: Vec<String> = self.clusters.read().unwrap().keys().cloned().collect();
        self.page(&names, next_token)
    }

    async fn list_addons(
        &self,
        cluster_name: &str,
        next_token: Option<String>,
    ) -> Result<Page<String>> {
        self.count(|ops| ops.lists += 1);

        if let Some(message) = self.faults.read().unwrap().list_addons.get(cluster_name) {
            return Err(AwsError::api("ListAddons", message.clone()));
        }

        let names: Vec<String> = {
            let clusters = self.clusters.read().unwrap();
            clusters
                .get(cluster_name)
                .ok_or_else(|| AwsError::ClusterNotFound {
                    cluster: cluster_name.to_string(),
                })?
                .keys()
                .cloned()
                .collect()
        };
        self.page(&names, next_token)
    }
}
