//! eksaddon AWS - EKS addon lifecycle
//!
//! This crate drives addons through an injected EKS capability:
//!
//! - **Client seams**: `LookupClient`, `TaggingClient` and `EksApi`
//! - **Lifecycle**: plan, create, read, update, delete and import
//! - **Tagging**: applying tag deltas with remove-before-set ordering
//! - **State**: file and in-memory state stores
//! - **Sweeping**: region-wide cleanup of leftover addons
//! - **Mock**: an in-memory EKS backend for tests

pub mod client;
pub mod error;
pub mod manager;
pub mod mock;
pub mod pagination;
pub mod resource;
pub mod state;
pub mod sweep;
pub mod tagging;

pub use client::{
    CreateAddonRequest, EksApi, LookupClient, Page, TaggingClient, UpdateAddonRequest,
};
pub use error::{AwsError, Result};
pub use manager::{AddonManager, ApplyOutcome};
pub use mock::{MockEksClient, OperationCounts, TagCall};
pub use pagination::paginate;
pub use resource::{AddonResource, AttributeChange, Plan, PlanAction};
pub use state::{FileStateStore, MemoryStateStore, StateStore};
pub use sweep::{SweepReport, sweep_addons};
pub use tagging::{apply_tag_delta, update_tags};
