//! File-based state store
//!
//! Layout: `<base>/<cluster>/<addon>.json`, pretty-printed so state can be
//! inspected and edited by hand.

use async_trait::async_trait;
use eksaddon_core::{AddonId, AddonState};
use std::path::{Path, PathBuf};

use super::{StateStore, deserialize_state, serialize_state};
use crate::error::{AwsError, Result};

pub struct FileStateStore {
    base_dir: PathBuf,
}

impl FileStateStore {
    /// Create a store rooted at `base_dir`, creating the directory
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Default location under the user's data directory
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eksaddon")
            .join("state")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn cluster_dir(&self, id: &AddonId) -> Result<PathBuf> {
        Ok(self.base_dir.join(path_component(id.cluster_name())?))
    }

    fn state_path(&self, id: &AddonId) -> Result<PathBuf> {
        Ok(self
            .cluster_dir(id)?
            .join(format!("{}.json", path_component(id.addon_name())?)))
    }

    async fn read_state(&self, path: &Path) -> Result<AddonState> {
        let data = tokio::fs::read(path).await?;
        deserialize_state(&data)
    }
}

/// Names become path components; refuse anything that would escape the base
fn path_component(name: &str) -> Result<&str> {
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(AwsError::Storage(format!(
            "'{}' cannot be used as a state file name",
            name
        )));
    }
    Ok(name)
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn get(&self, id: &AddonId) -> Result<Option<AddonState>> {
        let path = self.state_path(id)?;
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }
        self.read_state(&path).await.map(Some)
    }

    async fn put(&self, state: &AddonState) -> Result<()> {
        let path = self.state_path(&state.id)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let data = serialize_state(state)?;
        tokio::fs::write(&path, data).await?;
        Ok(())
    }

    async fn delete(&self, id: &AddonId) -> Result<Option<AddonState>> {
        let Some(state) = self.get(id).await? else {
            return Ok(None);
        };

        tokio::fs::remove_file(self.state_path(id)?).await?;

        // Clean up empty cluster directory
        let cluster_dir = self.cluster_dir(id)?;
        let mut entries = tokio::fs::read_dir(&cluster_dir).await?;
        if entries.next_entry().await?.is_none() {
            let _ = tokio::fs::remove_dir(&cluster_dir).await;
        }

        Ok(Some(state))
    }

    async fn list(&self) -> Result<Vec<AddonState>> {
        let mut states = Vec::new();

        let mut clusters = tokio::fs::read_dir(&self.base_dir).await?;
        while let Some(cluster) = clusters.next_entry().await? {
            if !cluster.file_type().await?.is_dir() {
                continue;
            }

            let mut files = tokio::fs::read_dir(cluster.path()).await?;
            while let Some(file) = files.next_entry().await? {
                let path = file.path();
                if path.extension().map(|e| e == "json").unwrap_or(false) {
                    states.push(self.read_state(&path).await?);
                }
            }
        }

        states.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(states)
    }
}
