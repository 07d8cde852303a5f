//! Region-wide cleanup of leftover addons

use eksaddon_core::AddonId;
use futures::TryStreamExt;
use std::pin::pin;
use tracing::{debug, info, warn};

use crate::client::EksApi;
use crate::error::{AwsError, Result};
use crate::pagination::paginate;

/// What a sweep deleted and what went wrong along the way
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub deleted: Vec<AddonId>,
    pub errors: Vec<String>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fail with [`AwsError::SweepFailed`] if any error was collected
    pub fn into_result(self) -> Result<Vec<AddonId>> {
        if self.errors.is_empty() {
            Ok(self.deleted)
        } else {
            Err(AwsError::SweepFailed {
                errors: self.errors,
            })
        }
    }
}

/// Delete every addon of every cluster the client can see.
///
/// Clusters are paged lazily; each cluster's addons are listed before any of
/// them is deleted. Listing or deleting failures for one cluster are collected
/// and the sweep moves on, and a cluster that disappears mid-sweep is skipped.
/// A failure to list clusters stops the sweep early but still returns the
/// report, with the listing error recorded alongside everything else.
pub async fn sweep_addons<C>(client: &C, region: &str) -> Result<SweepReport>
where
    C: EksApi + ?Sized,
{
    let mut report = SweepReport::default();

    let mut clusters = pin!(paginate(|token| client.list_clusters(token)));
    loop {
        let cluster = match clusters.try_next().await {
            Ok(Some(cluster)) => cluster,
            Ok(None) => break,
            Err(e) => {
                warn!(region, error = %e, "failed to list clusters");
                report
                    .errors
                    .push(format!("error listing EKS Clusters ({region}): {e}"));
                break;
            }
        };

        match sweep_cluster(client, &cluster, &mut report).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(cluster = %cluster, "cluster gone, skipping");
            }
            Err(e) => {
                warn!(cluster = %cluster, error = %e, "failed to sweep cluster");
                report
                    .errors
                    .push(format!("error listing EKS Add-Ons ({region}): {e}"));
            }
        }
    }

    info!(
        region,
        deleted = report.deleted.len(),
        errors = report.errors.len(),
        "sweep finished"
    );
    Ok(report)
}

async fn sweep_cluster<C>(client: &C, cluster: &str, report: &mut SweepReport) -> Result<()>
where
    C: EksApi + ?Sized,
{
    // Listed in full before deleting so deletions cannot shift later pages
    let addons: Vec<String> = paginate(|token| {
        let cluster = cluster.to_string();
        async move { client.list_addons(&cluster, token).await }
    })
    .try_collect()
    .await?;

    for addon in addons {
        let id = AddonId::new(cluster, &addon)?;
        match client.delete_addon(cluster, &addon).await {
            Ok(()) => {
                debug!(%id, "swept");
                report.deleted.push(id);
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => report
                .errors
                .push(format!("error deleting EKS Add-On ({id}): {e}")),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{
        CreateAddonRequest, LookupClient, Page, TaggingClient, UpdateAddonRequest,
    };
    use crate::mock::MockEksClient;
    use async_trait::async_trait;
    use eksaddon_core::{Addon, Tags};
    use std::collections::BTreeSet;

    /// Removes `cluster` right after it shows up in a cluster listing
    struct VanishingCluster {
        inner: MockEksClient,
        cluster: String,
    }

    #[async_trait]
    impl LookupClient for VanishingCluster {
        async fn find_addon(&self, cluster_name: &str, addon_name: &str) -> Result<Addon> {
            self.inner.find_addon(cluster_name, addon_name).await
        }
    }

    #[async_trait]
    impl TaggingClient for VanishingCluster {
        async fn tag_resource(&self, arn: &str, tags: &Tags) -> Result<()> {
            self.inner.tag_resource(arn, tags).await
        }

        async fn untag_resource(&self, arn: &str, keys: &BTreeSet<String>) -> Result<()> {
            self.inner.untag_resource(arn, keys).await
        }
    }

    #[async_trait]
    impl EksApi for VanishingCluster {
        async fn create_addon(&self, request: &CreateAddonRequest) -> Result<Addon> {
            self.inner.create_addon(request).await
        }

        async fn update_addon(&self, request: &UpdateAddonRequest) -> Result<Addon> {
            self.inner.update_addon(request).await
        }

        async fn delete_addon(&self, cluster_name: &str, addon_name: &str) -> Result<()> {
            self.inner.delete_addon(cluster_name, addon_name).await
        }

        async fn list_clusters(&self, next_token: Option<String>) -> Result<Page<String>> {
            let page = self.inner.list_clusters(next_token).await?;
            if page.items.contains(&self.cluster) {
                self.inner.remove_cluster(&self.cluster);
            }
            Ok(page)
        }

        async fn list_addons(
            &self,
            cluster_name: &str,
            next_token: Option<String>,
        ) -> Result<Page<String>> {
            self.inner.list_addons(cluster_name, next_token).await
        }
    }

    async fn seed(client: &MockEksClient, cluster: &str, addons: &[&str]) {
        client.add_cluster(cluster);
        for addon in addons {
            client
                .create_addon(&CreateAddonRequest {
                    cluster_name: cluster.to_string(),
                    addon_name: addon.to_string(),
                    addon_version: None,
                    resolve_conflicts: None,
                    service_account_role_arn: None,
                    tags: Tags::new(),
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_sweep_deletes_across_pages() {
        let client = MockEksClient::new().with_page_size(1);
        seed(&client, "one", &["coredns", "kube-proxy", "vpc-cni"]).await;
        seed(&client, "two", &["vpc-cni"]).await;

        let report = sweep_addons(&client, "us-west-2").await.unwrap();
        assert!(report.is_clean());
        assert_eq!(report.deleted.len(), 4);
        assert_eq!(client.addon_count(), 0);
        assert_eq!(report.deleted[0].encode(), "one:coredns");
    }

    #[tokio::test]
    async fn test_sweep_collects_list_errors() {
        let client = MockEksClient::new();
        seed(&client, "broken", &["vpc-cni"]).await;
        seed(&client, "healthy", &["vpc-cni"]).await;
        client.fail_list_addons("broken", "AccessDeniedException");

        let report = sweep_addons(&client, "us-west-2").await.unwrap();
        assert_eq!(report.deleted.len(), 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("AccessDeniedException"));

        let err = report.into_result().unwrap_err();
        assert!(matches!(err, AwsError::SweepFailed { .. }));
    }

    #[tokio::test]
    async fn test_sweep_empty_region() {
        let client = MockEksClient::new();
        let report = sweep_addons(&client, "us-west-2").await.unwrap();
        assert_eq!(report, SweepReport::default());
        assert_eq!(report.into_result().unwrap(), Vec::<AddonId>::new());
    }

    #[tokio::test]
    async fn test_sweep_skips_vanished_cluster() {
        let inner = MockEksClient::new();
        seed(&inner, "gone", &["vpc-cni"]).await;
        seed(&inner, "kept", &["coredns"]).await;
        let client = VanishingCluster {
            inner: inner.clone(),
            cluster: "gone".to_string(),
        };

        let report = sweep_addons(&client, "us-west-2").await.unwrap();
        assert!(report.is_clean());
        assert_eq!(report.deleted.len(), 1);
        assert_eq!(report.deleted[0].encode(), "kept:coredns");
        assert_eq!(inner.addon_count(), 0);
    }

    #[tokio::test]
    async fn test_sweep_collects_delete_errors() {
        let client = MockEksClient::new();
        seed(&client, "demo", &["coredns", "kube-proxy", "vpc-cni"]).await;
        client.fail_delete("demo", "kube-proxy", "ResourceInUseException");

        let report = sweep_addons(&client, "us-west-2").await.unwrap();
        let deleted: Vec<String> = report.deleted.iter().map(AddonId::encode).collect();
        assert_eq!(deleted, vec!["demo:coredns", "demo:vpc-cni"]);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("demo:kube-proxy"));
        assert!(report.errors[0].contains("ResourceInUseException"));
        assert_eq!(client.addon_count(), 1);
    }

    #[tokio::test]
    async fn test_sweep_keeps_report_when_cluster_listing_fails() {
        let client = MockEksClient::new().with_page_size(1);
        seed(&client, "one", &["vpc-cni"]).await;
        seed(&client, "two", &["vpc-cni"]).await;
        client.fail_list_clusters_from(1, "ThrottlingException");

        let report = sweep_addons(&client, "us-west-2").await.unwrap();
        assert_eq!(report.deleted.len(), 1);
        assert_eq!(report.deleted[0].encode(), "one:vpc-cni");
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("error listing EKS Clusters (us-west-2)"));
        assert!(report.errors[0].contains("ThrottlingException"));
        assert_eq!(client.addon_count(), 1);

        let err = report.into_result().unwrap_err();
        assert!(matches!(err, AwsError::SweepFailed { ref errors } if errors.len() == 1));
    }
}
