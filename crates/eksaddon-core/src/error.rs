//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("unexpected format for ID ({id}), expected cluster-name:addon-name")]
    MalformedId { id: String },

    #[error(
        "\"tags\" are identical to those in the \"default_tags\" configuration block: {}",
        keys.join(", ")
    )]
    AmbiguousTags { keys: Vec<String> },

    #[error("invalid tag '{key}': {reason}")]
    InvalidTag { key: String, reason: String },

    #[error("invalid addon version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("invalid ARN '{arn}': {reason}")]
    InvalidArn { arn: String, reason: String },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
