//! In-memory state store

use async_trait::async_trait;
use eksaddon_core::{AddonId, AddonState};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::StateStore;
use crate::error::Result;

#[derive(Clone, Default)]
pub struct MemoryStateStore {
    states: Arc<RwLock<BTreeMap<AddonId, AddonState>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, id: &AddonId) -> Result<Option<AddonState>> {
        Ok(self.states.read().unwrap().get(id).cloned())
    }

    async fn put(&self, state: &AddonState) -> Result<()> {
        self.states
            .write()
            .unwrap()
            .insert(state.id.clone(), state.clone());
        Ok(())
    }

    async fn delete(&self, id: &AddonId) -> Result<Option<AddonState>> {
        Ok(self.states.write().unwrap().remove(id))
    }

    async fn list(&self) -> Result<Vec<AddonState>> {
        Ok(self.states.read().unwrap().values().cloned().collect())
    }
}
