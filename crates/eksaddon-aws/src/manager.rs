//! Addon manager - orchestrates lifecycle operations and state

use eksaddon_core::{AddonId, AddonSpec, AddonState, TagPolicy};
use tracing::{debug, info};

use crate::client::EksApi;
use crate::error::{AwsError, Result};
use crate::resource::{AddonResource, Plan, PlanAction};
use crate::state::StateStore;

/// Result of applying a spec
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    /// The plan that was executed
    pub plan: Plan,
    /// State recorded after the apply
    pub state: AddonState,
}

impl ApplyOutcome {
    pub fn action(&self) -> PlanAction {
        self.plan.action
    }
}

/// Ties the addon lifecycle to a state store
///
/// Every operation refreshes recorded state against EKS first, so addons
/// deleted out of band are dropped from state and planned for creation again.
pub struct AddonManager<C, S> {
    resource: AddonResource<C>,
    store: S,
}

impl<C: EksApi, S: StateStore> AddonManager<C, S> {
    pub fn new(client: C, policy: TagPolicy, store: S) -> Self {
        Self {
            resource: AddonResource::new(client, policy),
            store,
        }
    }

    pub fn resource(&self) -> &AddonResource<C> {
        &self.resource
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Plan a spec against refreshed state without changing anything remotely
    pub async fn plan(&self, spec: &AddonSpec) -> Result<Plan> {
        let id = spec.id()?;
        let current = self.refreshed(&id).await?;
        self.resource.plan(spec, current.as_ref())
    }

    /// Converge the addon on the spec and record the resulting state
    pub async fn apply(&self, spec: &AddonSpec) -> Result<ApplyOutcome> {
        let id = spec.id()?;
        let current = self.refreshed(&id).await?;
        let plan = self.resource.plan(spec, current.as_ref())?;
        debug!(%id, action = %plan.action, "applying plan");

        let state = match (plan.action, current) {
            (PlanAction::NoOp, Some(state)) => state,
            (PlanAction::Update, Some(state)) => self.resource.update(&state, spec).await?,
            // State is keyed by the spec's ID, so a prior record never names another addon
            _ => self.resource.create(spec).await?,
        };

        self.store.put(&state).await?;
        info!(%id, action = %plan.action, "applied");

        Ok(ApplyOutcome { plan, state })
    }

    /// Refresh recorded state; `None` means the addon is gone and was dropped
    pub async fn refresh(&self, id: &AddonId) -> Result<Option<AddonState>> {
        if self.store.get(id).await?.is_none() {
            return Err(AwsError::StateNotFound { id: id.to_string() });
        }
        self.refreshed(id).await
    }

    /// Import an existing addon into state
    pub async fn import(&self, raw_id: &str) -> Result<AddonState> {
        let state = self.resource.import(raw_id).await?;
        self.store.put(&state).await?;
        info!(id = %state.id, "imported");
        Ok(state)
    }

    /// Delete the addon and forget its state
    pub async fn destroy(&self, id: &AddonId) -> Result<Option<AddonState>> {
        self.resource.delete(id).await?;
        self.store.delete(id).await
    }

    /// Check whether the addon exists in EKS
    pub async fn exists(&self, id: &AddonId) -> Result<bool> {
        self.resource.exists(id).await
    }

    /// All recorded states
    pub async fn states(&self) -> Result<Vec<AddonState>> {
        self.store.list().await
    }

    async fn refreshed(&self, id: &AddonId) -> Result<Option<AddonState>> {
        let Some(prior) = self.store.get(id).await? else {
            return Ok(None);
        };

        match self.resource.read(id, Some(&prior)).await? {
            Some(state) => {
                self.store.put(&state).await?;
                Ok(Some(state))
            }
            None => {
                self.store.delete(id).await?;
                Ok(None)
            }
        }
    }
}
