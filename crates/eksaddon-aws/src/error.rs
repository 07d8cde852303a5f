//! Error types for eksaddon-aws

use thiserror::Error;

/// Result type for eksaddon-aws operations
pub type Result<T> = std::result::Result<T, AwsError>;

/// Errors that can occur while managing addons
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AwsError {
    /// Addon does not exist
    #[error("EKS Add-On ({cluster}:{addon}) not found")]
    AddonNotFound { cluster: String, addon: String },

    /// Cluster does not exist
    #[error("EKS Cluster ({cluster}) not found")]
    ClusterNotFound { cluster: String },

    /// Addon already exists
    #[error("EKS Add-On ({cluster}:{addon}) already exists")]
    AddonAlreadyExists { cluster: String, addon: String },

    /// Tagging call failed; never retried here
    #[error("error updating EKS Add-On ({arn}) tags: {message}")]
    RemoteTagging { arn: String, message: String },

    /// Any other failed API call
    #[error("EKS API error during {operation}: {message}")]
    Api { operation: String, message: String },

    /// No state recorded for a resource ID
    #[error("no state recorded for EKS Add-On ({id})\nHint: Run `eksaddon import {id}` to adopt an existing addon")]
    StateNotFound { id: String },

    /// Sweep finished with errors
    #[error("sweeping EKS Add-Ons finished with {} error(s):\n{}", errors.len(), errors.join("\n"))]
    SweepFailed { errors: Vec<String> },

    /// State storage error
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid input, identifiers or tags
    #[error(transparent)]
    Core(#[from] eksaddon_core::CoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for AwsError {
    fn from(e: serde_json::Error) -> Self {
        AwsError::Serialization(e.to_string())
    }
}

impl AwsError {
    pub(crate) fn api(operation: &str, message: impl Into<String>) -> Self {
        AwsError::Api {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    /// Check if the addon or its cluster no longer exists
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AwsError::AddonNotFound { .. } | AwsError::ClusterNotFound { .. }
        )
    }
}
