//! CLI commands

pub mod diff;
pub mod id;
pub mod tags;
pub mod validate;

use eksaddon_core::{AddonSpec, ProviderConfig, Tags};
use std::path::Path;
use tracing::debug;

use crate::error::{CliError, Result};

/// Load the provider configuration, falling back to the default location
pub(crate) fn load_provider(path: Option<&Path>) -> Result<ProviderConfig> {
    let config = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading provider configuration");
            ProviderConfig::load_from(path)
        }
        None => ProviderConfig::load(),
    };
    config.map_err(CliError::config)
}

pub(crate) fn load_spec(path: &Path) -> Result<AddonSpec> {
    debug!(path = %path.display(), "loading addon spec");
    Ok(AddonSpec::from_file(path)?)
}

/// Load a flat tag map from a YAML or JSON file
pub(crate) fn load_tags(path: &Path) -> Result<Tags> {
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| CliError::Input {
        message: format!("{}: {}", path.display(), e),
    })
}
