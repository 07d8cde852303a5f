//! Addon lifecycle scenarios against the in-memory EKS backend

use eksaddon_aws::{
    AddonManager, AwsError, LookupClient, MemoryStateStore, MockEksClient, PlanAction,
    StateStore, TagCall,
};
use eksaddon_core::{
    AddonArn, AddonId, AddonSpec, CoreError, IgnoreTags, ResolveConflicts, TagPolicy, Tags,
};

const CLUSTER: &str = "tf-acc-test";
const ADDON: &str = "vpc-cni";

fn tags(pairs: &[(&str, &str)]) -> Tags {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn defaults(pairs: &[(&str, &str)]) -> TagPolicy {
    TagPolicy::new(tags(pairs), IgnoreTags::new())
}

fn spec() -> AddonSpec {
    AddonSpec::new(CLUSTER, ADDON)
}

fn spec_with_tags(pairs: &[(&str, &str)]) -> AddonSpec {
    pairs
        .iter()
        .fold(spec(), |spec, (k, v)| spec.with_tag(*k, *v))
}

/// Shared backend and state; each step builds a manager with its own policy
struct Harness {
    client: MockEksClient,
    store: MemoryStateStore,
}

impl Harness {
    fn new() -> Self {
        Self {
            client: MockEksClient::new().with_cluster(CLUSTER),
            store: MemoryStateStore::new(),
        }
    }

    fn manager(&self, policy: TagPolicy) -> AddonManager<MockEksClient, MemoryStateStore> {
        AddonManager::new(self.client.clone(), policy, self.store.clone())
    }

    async fn remote_tags(&self) -> Tags {
        self.client.find_addon(CLUSTER, ADDON).await.unwrap().tags
    }

    fn id(&self) -> AddonId {
        AddonId::new(CLUSTER, ADDON).unwrap()
    }
}

mod basic {
    use super::*;

    #[tokio::test]
    async fn test_create_and_import() {
        let h = Harness::new();
        let manager = h.manager(TagPolicy::default());

        let state = manager.apply(&spec()).await.unwrap().state;
        assert_eq!(state.id.encode(), "tf-acc-test:vpc-cni");
        assert!(state.tags.is_empty());

        let arn = AddonArn::parse(&state.arn).unwrap();
        assert_eq!(arn.partition, "aws");
        assert_eq!(arn.region, "us-west-2");
        assert_eq!(arn.cluster_name, CLUSTER);
        assert_eq!(arn.addon_name, ADDON);
        assert!(!arn.suffix.is_empty());

        let imported = manager
            .resource()
            .import("tf-acc-test:vpc-cni")
            .await
            .unwrap();
        assert!(state.matches_imported(&imported));
    }

    #[tokio::test]
    async fn test_disappears() {
        let h = Harness::new();
        let manager = h.manager(TagPolicy::default());
        manager.apply(&spec()).await.unwrap();

        assert!(h.client.remove_addon(CLUSTER, ADDON));

        assert_eq!(manager.refresh(&h.id()).await.unwrap(), None);
        assert!(h.store.get(&h.id()).await.unwrap().is_none());
        assert_eq!(
            manager.plan(&spec()).await.unwrap().action,
            PlanAction::Create
        );
    }

    #[tokio::test]
    async fn test_disappears_cluster() {
        let h = Harness::new();
        let manager = h.manager(TagPolicy::default());
        manager.apply(&spec()).await.unwrap();

        assert!(h.client.remove_cluster(CLUSTER));

        assert_eq!(manager.refresh(&h.id()).await.unwrap(), None);
        manager.destroy(&h.id()).await.unwrap();
    }

    #[tokio::test]
    async fn test_import_unknown_addon() {
        let h = Harness::new();
        let manager = h.manager(TagPolicy::default());

        let err = manager.import("tf-acc-test:coredns").await.unwrap_err();
        assert!(err.is_not_found());

        let err = manager.import("tf-acc-test").await.unwrap_err();
        assert!(matches!(err, AwsError::Core(CoreError::MalformedId { .. })));
    }
}

mod attributes {
    use super::*;

    #[tokio::test]
    async fn test_addon_version() {
        let h = Harness::new();
        let manager = h.manager(TagPolicy::default());

        let state = manager
            .apply(&spec().with_version("v1.8.0-eksbuild.1"))
            .await
            .unwrap()
            .state;
        assert_eq!(state.addon_version, "v1.8.0-eksbuild.1");

        let outcome = manager
            .apply(&spec().with_version("v1.9.0-eksbuild.1"))
            .await
            .unwrap();
        assert_eq!(outcome.action(), PlanAction::Update);
        assert_eq!(outcome.plan.changes[0].attribute, "addon_version");
        assert_eq!(outcome.state.addon_version, "v1.9.0-eksbuild.1");
        assert_eq!(h.client.operation_counts().updates, 1);
    }

    #[tokio::test]
    async fn test_unset_version_is_left_alone() {
        let h = Harness::new();
        let manager = h.manager(TagPolicy::default());
        manager
            .apply(&spec().with_version("v1.8.0-eksbuild.1"))
            .await
            .unwrap();

        let outcome = manager.apply(&spec()).await.unwrap();
        assert_eq!(outcome.action(), PlanAction::NoOp);
        assert_eq!(outcome.state.addon_version, "v1.8.0-eksbuild.1");
    }

    #[tokio::test]
    async fn test_resolve_conflicts() {
        let h = Harness::new();
        let manager = h.manager(TagPolicy::default());

        let state = manager
            .apply(&spec().with_resolve_conflicts(ResolveConflicts::None))
            .await
            .unwrap()
            .state;
        assert_eq!(state.resolve_conflicts, Some(ResolveConflicts::None));

        let state = manager
            .apply(&spec().with_resolve_conflicts(ResolveConflicts::Overwrite))
            .await
            .unwrap()
            .state;
        assert_eq!(state.resolve_conflicts, Some(ResolveConflicts::Overwrite));

        // write-only on the EKS side
        let imported = manager
            .resource()
            .import(&state.id.encode())
            .await
            .unwrap();
        assert_eq!(imported.resolve_conflicts, None);
        assert!(state.matches_imported(&imported));
    }

    #[tokio::test]
    async fn test_service_account_role_arn() {
        let h = Harness::new();
        let manager = h.manager(TagPolicy::default());
        let role = "arn:aws:iam::123456789012:role/tf-acc-test";

        let state = manager
            .apply(&spec().with_service_account_role_arn(role))
            .await
            .unwrap()
            .state;
        assert_eq!(state.service_account_role_arn.as_deref(), Some(role));

        let remote = h.client.find_addon(CLUSTER, ADDON).await.unwrap();
        assert_eq!(remote.service_account_role_arn.as_deref(), Some(role));
    }

    #[tokio::test]
    async fn test_invalid_role_arn_rejected_before_create() {
        let h = Harness::new();
        let manager = h.manager(TagPolicy::default());

        let result = manager
            .apply(&spec().with_service_account_role_arn("not-an-arn"))
            .await;
        assert!(result.is_err());
        assert_eq!(h.client.operation_counts().creates, 0);
    }
}

mod resource_tags {
    use super::*;

    #[tokio::test]
    async fn test_tags_lifecycle() {
        let h = Harness::new();
        let manager = h.manager(TagPolicy::default());

        let state = manager
            .apply(&spec_with_tags(&[("key1", "value1")]))
            .await
            .unwrap()
            .state;
        assert_eq!(state.tags, tags(&[("key1", "value1")]));

        let state = manager
            .apply(&spec_with_tags(&[
                ("key1", "value1updated"),
                ("key2", "value2"),
            ]))
            .await
            .unwrap()
            .state;
        assert_eq!(
            state.tags,
            tags(&[("key1", "value1updated"), ("key2", "value2")])
        );

        let state = manager
            .apply(&spec_with_tags(&[("key2", "value2")]))
            .await
            .unwrap()
            .state;
        assert_eq!(state.tags, tags(&[("key2", "value2")]));
        assert_eq!(h.remote_tags().await, tags(&[("key2", "value2")]));
    }

    #[tokio::test]
    async fn test_removals_sent_before_upserts() {
        let h = Harness::new();
        let manager = h.manager(TagPolicy::default());
        let arn = manager
            .apply(&spec_with_tags(&[("key1", "value1")]))
            .await
            .unwrap()
            .state
            .arn;

        manager
            .apply(&spec_with_tags(&[("key2", "value2")]))
            .await
            .unwrap();

        assert_eq!(
            h.client.tag_log(),
            vec![
                TagCall::Untag {
                    arn: arn.clone(),
                    keys: ["key1".to_string()].into_iter().collect(),
                },
                TagCall::Tag {
                    arn,
                    tags: tags(&[("key2", "value2")]),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_tagging_failure_surfaces() {
        let h = Harness::new();
        let manager = h.manager(TagPolicy::default());
        manager
            .apply(&spec_with_tags(&[("key1", "value1")]))
            .await
            .unwrap();

        h.client.fail_tagging("ThrottlingException");
        let err = manager
            .apply(&spec_with_tags(&[("key1", "value2")]))
            .await
            .unwrap_err();
        assert!(matches!(err, AwsError::RemoteTagging { .. }));
        assert!(err.to_string().contains("ThrottlingException"));
        assert_eq!(h.client.operation_counts().tags, 1);
    }
}

mod default_tags {
    use super::*;

    #[tokio::test]
    async fn test_provider_only() {
        let h = Harness::new();

        let state = h
            .manager(defaults(&[("providerkey1", "providervalue1")]))
            .apply(&spec())
            .await
            .unwrap()
            .state;
        assert!(state.tags.is_empty());
        assert_eq!(state.tags_all, tags(&[("providerkey1", "providervalue1")]));

        let state = h
            .manager(defaults(&[
                ("providerkey1", "value1updated"),
                ("providerkey2", "value2"),
            ]))
            .apply(&spec())
            .await
            .unwrap()
            .state;
        assert!(state.tags.is_empty());
        assert_eq!(
            state.tags_all,
            tags(&[("providerkey1", "value1updated"), ("providerkey2", "value2")])
        );

        let state = h
            .manager(defaults(&[("providerkey2", "value2")]))
            .apply(&spec())
            .await
            .unwrap()
            .state;
        assert_eq!(state.tags_all, tags(&[("providerkey2", "value2")]));
        assert_eq!(h.remote_tags().await, tags(&[("providerkey2", "value2")]));
    }

    #[tokio::test]
    async fn test_update_to_provider_only() {
        let h = Harness::new();

        h.manager(TagPolicy::default())
            .apply(&spec_with_tags(&[("key1", "value1")]))
            .await
            .unwrap();

        let manager = h.manager(defaults(&[("key1", "value1")]));
        let plan = manager.plan(&spec()).await.unwrap();
        assert!(plan.tag_delta.is_empty());

        let state = manager.apply(&spec()).await.unwrap().state;
        assert!(state.tags.is_empty());
        assert_eq!(state.tags_all, tags(&[("key1", "value1")]));
    }

    #[tokio::test]
    async fn test_update_to_resource_only() {
        let h = Harness::new();

        let state = h
            .manager(defaults(&[("key1", "value1")]))
            .apply(&spec())
            .await
            .unwrap()
            .state;
        assert!(state.tags.is_empty());

        let state = h
            .manager(TagPolicy::default())
            .apply(&spec_with_tags(&[("key1", "value1")]))
            .await
            .unwrap()
            .state;
        assert_eq!(state.tags, tags(&[("key1", "value1")]));
        assert_eq!(state.tags_all, tags(&[("key1", "value1")]));
    }

    #[tokio::test]
    async fn test_non_overlapping() {
        let h = Harness::new();

        let state = h
            .manager(defaults(&[("providerkey1", "providervalue1")]))
            .apply(&spec_with_tags(&[("resourcekey1", "resourcevalue1")]))
            .await
            .unwrap()
            .state;
        assert_eq!(state.tags, tags(&[("resourcekey1", "resourcevalue1")]));
        assert_eq!(
            state.tags_all,
            tags(&[
                ("providerkey1", "providervalue1"),
                ("resourcekey1", "resourcevalue1"),
            ])
        );

        let state = h
            .manager(defaults(&[("providerkey1", "providervalue1")]))
            .apply(&spec_with_tags(&[("resourcekey2", "resourcevalue2")]))
            .await
            .unwrap()
            .state;
        assert_eq!(
            state.tags_all,
            tags(&[
                ("providerkey1", "providervalue1"),
                ("resourcekey2", "resourcevalue2"),
            ])
        );
    }

    #[tokio::test]
    async fn test_overlapping() {
        let h = Harness::new();

        let state = h
            .manager(defaults(&[("overlapkey1", "providervalue1")]))
            .apply(&spec_with_tags(&[("overlapkey1", "resourcevalue1")]))
            .await
            .unwrap()
            .state;
        assert_eq!(state.tags, tags(&[("overlapkey1", "resourcevalue1")]));
        assert_eq!(state.tags_all, tags(&[("overlapkey1", "resourcevalue1")]));

        let state = h
            .manager(defaults(&[("overlapkey1", "providervalue1")]))
            .apply(&spec_with_tags(&[("overlapkey1", "resourcevalue2")]))
            .await
            .unwrap()
            .state;
        assert_eq!(state.tags_all, tags(&[("overlapkey1", "resourcevalue2")]));
    }

    #[tokio::test]
    async fn test_duplicate_tag_is_rejected() {
        let h = Harness::new();
        let manager = h.manager(defaults(&[("overlapkey", "overlapvalue")]));

        let err = manager
            .apply(&spec_with_tags(&[("overlapkey", "overlapvalue")]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AwsError::Core(CoreError::AmbiguousTags { .. })
        ));
        assert!(err.to_string().contains(
            r#""tags" are identical to those in the "default_tags" configuration block"#
        ));
        assert_eq!(h.client.addon_count(), 0);
    }
}

mod ignore_tags {
    use super::*;

    #[tokio::test]
    async fn test_out_of_band_tags_ignored_by_key_and_prefix() {
        let h = Harness::new();
        let state = h
            .manager(TagPolicy::default())
            .apply(&spec_with_tags(&[("key1", "value1")]))
            .await
            .unwrap()
            .state;

        eksaddon_aws::update_tags(
            &h.client,
            &state.arn,
            &Tags::new(),
            &tags(&[("ignorekey1", "ignorevalue1"), ("ignoreprefix:a", "b")]),
        )
        .await
        .unwrap();

        let policy = TagPolicy::new(
            Tags::new(),
            IgnoreTags::new()
                .with_keys(["ignorekey1"])
                .with_prefixes(["ignoreprefix"]),
        );
        let plan = h
            .manager(policy)
            .plan(&spec_with_tags(&[("key1", "value1")]))
            .await
            .unwrap();
        assert!(plan.is_empty());

        // without the ignore configuration the out-of-band tags would be removed
        let plan = h
            .manager(TagPolicy::default())
            .plan(&spec_with_tags(&[("key1", "value1")]))
            .await
            .unwrap();
        assert_eq!(plan.tag_delta.to_remove.len(), 2);
    }

    #[tokio::test]
    async fn test_default_and_ignore_tags() {
        let h = Harness::new();
        let policy = TagPolicy::new(
            tags(&[("defaultkey1", "defaultvalue1")]),
            IgnoreTags::new().with_keys(["defaultkey1"]),
        );

        let state = h
            .manager(policy)
            .apply(&spec_with_tags(&[("key1", "value1")]))
            .await
            .unwrap()
            .state;
        assert_eq!(state.tags_all, tags(&[("key1", "value1")]));
        assert_eq!(h.remote_tags().await, tags(&[("key1", "value1")]));
    }
}
