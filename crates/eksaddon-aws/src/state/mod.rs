//! State stores for managed addons
//!
//! - **File**: one JSON document per addon under a base directory
//! - **Memory**: in-process map, for tests

mod file;
mod memory;

pub use file::FileStateStore;
pub use memory::MemoryStateStore;

use async_trait::async_trait;
use eksaddon_core::{AddonId, AddonState};

use crate::error::Result;

/// Persistence for addon state, keyed by resource ID
///
/// Implementations must be Send + Sync for use across async tasks.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the recorded state, if any
    async fn get(&self, id: &AddonId) -> Result<Option<AddonState>>;

    /// Insert or replace the state for `state.id`
    async fn put(&self, state: &AddonState) -> Result<()>;

    /// Remove the state, returning what was recorded
    async fn delete(&self, id: &AddonId) -> Result<Option<AddonState>>;

    /// All recorded states, ordered by ID
    async fn list(&self) -> Result<Vec<AddonState>>;
}

fn serialize_state(state: &AddonState) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(state)?)
}

fn deserialize_state(data: &[u8]) -> Result<AddonState> {
    Ok(serde_json::from_slice(data)?)
}
