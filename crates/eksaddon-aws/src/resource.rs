//! Addon resource lifecycle: plan, create, read, update, delete, import

use eksaddon_core::{
    Addon, AddonId, AddonSpec, AddonState, CoreError, ResolveConflicts, TagDelta, TagPolicy, Tags,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::client::{CreateAddonRequest, EksApi, UpdateAddonRequest};
use crate::error::Result;
use crate::tagging::apply_tag_delta;

/// What applying a spec would do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanAction {
    Create,
    Update,
    /// Identity changed; delete then create
    Replace,
    NoOp,
}

impl std::fmt::Display for PlanAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::NoOp => "no-op",
        };
        write!(f, "{}", s)
    }
}

/// A single attribute that differs between state and spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeChange {
    pub attribute: String,
    pub old: Option<String>,
    pub new: Option<String>,
}

impl AttributeChange {
    fn new(attribute: &str, old: Option<String>, new: Option<String>) -> Self {
        Self {
            attribute: attribute.to_string(),
            old,
            new,
        }
    }
}

/// Planned changes for one addon
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: AddonId,
    pub action: PlanAction,
    pub changes: Vec<AttributeChange>,
    pub tag_delta: TagDelta,
    /// Effective tags after the plan is applied
    pub tags_all: Tags,
}

impl Plan {
    /// True when applying would change nothing
    pub fn is_empty(&self) -> bool {
        self.action == PlanAction::NoOp
    }
}

/// Lifecycle hooks for an EKS addon
///
/// The client capability and the provider tag policy are injected; nothing is
/// read from ambient state.
pub struct AddonResource<C> {
    client: C,
    policy: TagPolicy,
}

impl<C: EksApi> AddonResource<C> {
    pub fn new(client: C, policy: TagPolicy) -> Self {
        Self { client, policy }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn policy(&self) -> &TagPolicy {
        &self.policy
    }

    /// Compare a spec with the (refreshed) prior state.
    ///
    /// Tags declared identically at provider and resource level fail here,
    /// before anything is sent to EKS.
    pub fn plan(&self, spec: &AddonSpec, prior: Option<&AddonState>) -> Result<Plan> {
        spec.validate()?;
        let id = spec.id()?;
        let tags_all = self.policy.effective_tags(&spec.tags)?;

        let (action, changes, tag_delta) = match prior {
            None => (
                PlanAction::Create,
                creation_changes(spec),
                self.policy.diff(&Tags::new(), &tags_all),
            ),
            Some(prior) if prior.id != id => {
                let mut changes = vec![
                    AttributeChange::new(
                        "cluster_name",
                        Some(prior.cluster_name.clone()),
                        Some(spec.cluster_name.clone()),
                    ),
                    AttributeChange::new(
                        "addon_name",
                        Some(prior.addon_name.clone()),
                        Some(spec.addon_name.clone()),
                    ),
                ];
                changes.retain(|c| c.old != c.new);
                (
                    PlanAction::Replace,
                    changes,
                    self.policy.diff(&Tags::new(), &tags_all),
                )
            }
            Some(prior) => {
                let changes = attribute_changes(prior, spec);
                let tag_delta = self.policy.diff(&prior.tags_all, &tags_all);
                let action = if changes.is_empty() && tag_delta.is_empty() {
                    PlanAction::NoOp
                } else {
                    PlanAction::Update
                };
                (action, changes, tag_delta)
            }
        };

        Ok(Plan {
            id,
            action,
            changes,
            tag_delta,
            tags_all,
        })
    }

    /// Create the addon with its effective tags
    pub async fn create(&self, spec: &AddonSpec) -> Result<AddonState> {
        spec.validate()?;
        let id = spec.id()?;
        let tags_all = self.policy.effective_tags(&spec.tags)?;

        debug!(%id, tags = tags_all.len(), "creating EKS Add-On");
        let addon = self
            .client
            .create_addon(&CreateAddonRequest {
                cluster_name: spec.cluster_name.clone(),
                addon_name: spec.addon_name.clone(),
                addon_version: spec.addon_version.clone(),
                resolve_conflicts: spec.resolve_conflicts,
                service_account_role_arn: spec.service_account_role_arn.clone(),
                tags: tags_all,
            })
            .await?;
        info!(%id, arn = %addon.arn, "created EKS Add-On");

        self.state_from(&addon, spec.resolve_conflicts)
    }

    /// Read the addon; `None` means it is gone and should leave state
    pub async fn read(
        &self,
        id: &AddonId,
        prior: Option<&AddonState>,
    ) -> Result<Option<AddonState>> {
        match self
            .client
            .find_addon(id.cluster_name(), id.addon_name())
            .await
        {
            Ok(addon) => {
                let resolve_conflicts = prior.and_then(|p| p.resolve_conflicts);
                self.state_from(&addon, resolve_conflicts).map(Some)
            }
            Err(e) if e.is_not_found() => {
                warn!(%id, "EKS Add-On not found, removing from state");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Update the addon in place and reconcile its tags
    pub async fn update(&self, prior: &AddonState, spec: &AddonSpec) -> Result<AddonState> {
        let id = spec.id()?;
        if id != prior.id {
            return Err(CoreError::invalid_input(
                "addon",
                format!("{} cannot be updated in place to {}", prior.id, id),
            )
            .into());
        }
        spec.validate()?;
        let tags_all = self.policy.effective_tags(&spec.tags)?;

        let request = update_request(prior, spec);
        if !request.is_empty() {
            debug!(%id, ?request, "updating EKS Add-On");
            self.client.update_addon(&request).await?;
        }

        let remote = self
            .client
            .find_addon(id.cluster_name(), id.addon_name())
            .await?;
        let delta = self.policy.diff(&remote.tags, &tags_all);
        apply_tag_delta(&self.client, &remote.arn, &delta).await?;

        let addon = if delta.is_empty() {
            remote
        } else {
            self.client
                .find_addon(id.cluster_name(), id.addon_name())
                .await?
        };

        self.state_from(&addon, spec.resolve_conflicts.or(prior.resolve_conflicts))
    }

    /// Delete the addon; an addon that is already gone counts as deleted
    pub async fn delete(&self, id: &AddonId) -> Result<()> {
        match self
            .client
            .delete_addon(id.cluster_name(), id.addon_name())
            .await
        {
            Ok(()) => {
                info!(%id, "deleted EKS Add-On");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!(%id, "EKS Add-On already deleted");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Adopt an existing addon by its resource ID
    pub async fn import(&self, raw_id: &str) -> Result<AddonState> {
        let id = AddonId::parse(raw_id)?;
        let addon = self
            .client
            .find_addon(id.cluster_name(), id.addon_name())
            .await?;
        debug!(%id, arn = %addon.arn, "imported EKS Add-On");
        self.state_from(&addon, None)
    }

    /// Check whether the addon exists remotely
    pub async fn exists(&self, id: &AddonId) -> Result<bool> {
        match self
            .client
            .find_addon(id.cluster_name(), id.addon_name())
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn state_from(
        &self,
        addon: &Addon,
        resolve_conflicts: Option<ResolveConflicts>,
    ) -> Result<AddonState> {
        let (tags, tags_all) = self.policy.import_view(&addon.tags);
        Ok(AddonState::from_remote(
            addon,
            resolve_conflicts,
            tags,
            tags_all,
        )?)
    }
}

fn creation_changes(spec: &AddonSpec) -> Vec<AttributeChange> {
    let mut changes = vec![
        AttributeChange::new("cluster_name", None, Some(spec.cluster_name.clone())),
        AttributeChange::new("addon_name", None, Some(spec.addon_name.clone())),
    ];
    if let Some(version) = &spec.addon_version {
        changes.push(AttributeChange::new("addon_version", None, Some(version.clone())));
    }
    if let Some(resolve) = spec.resolve_conflicts {
        changes.push(AttributeChange::new(
            "resolve_conflicts",
            None,
            Some(resolve.to_string()),
        ));
    }
    if let Some(role) = &spec.service_account_role_arn {
        changes.push(AttributeChange::new(
            "service_account_role_arn",
            None,
            Some(role.clone()),
        ));
    }
    changes
}

// Unset optional attributes are left as they are remotely.
fn attribute_changes(prior: &AddonState, spec: &AddonSpec) -> Vec<AttributeChange> {
    let mut changes = Vec::new();

    if let Some(version) = &spec.addon_version {
        if *version != prior.addon_version {
            changes.push(AttributeChange::new(
                "addon_version",
                Some(prior.addon_version.clone()),
                Some(version.clone()),
            ));
        }
    }
    if spec.resolve_conflicts.is_some() && spec.resolve_conflicts != prior.resolve_conflicts {
        changes.push(AttributeChange::new(
            "resolve_conflicts",
            prior.resolve_conflicts.map(|r| r.to_string()),
            spec.resolve_conflicts.map(|r| r.to_string()),
        ));
    }
    if spec.service_account_role_arn.is_some()
        && spec.service_account_role_arn != prior.service_account_role_arn
    {
        changes.push(AttributeChange::new(
            "service_account_role_arn",
            prior.service_account_role_arn.clone(),
            spec.service_account_role_arn.clone(),
        ));
    }

    changes
}

// resolve_conflicts alone does not warrant an UpdateAddon call; it only rides
// along with a version or role change.
fn update_request(prior: &AddonState, spec: &AddonSpec) -> UpdateAddonRequest {
    let mut request = UpdateAddonRequest::new(&spec.cluster_name, &spec.addon_name);

    request.addon_version = spec
        .addon_version
        .clone()
        .filter(|v| *v != prior.addon_version);
    request.service_account_role_arn = spec
        .service_account_role_arn
        .clone()
        .filter(|r| prior.service_account_role_arn.as_ref() != Some(r));

    if !request.is_empty() {
        request.resolve_conflicts = spec.resolve_conflicts;
    }
    request
}
