//! CLI error types with exit code handling

use eksaddon_core::CoreError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Spec, tags or resource ID rejected
    #[error("Validation failed: {message}")]
    #[diagnostic(code(eksaddon::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Validation found problems that were already reported
    #[error("Validation failed with {errors} error(s)")]
    #[diagnostic(code(eksaddon::cli::invalid))]
    ValidationFailed { errors: usize },

    /// Provider configuration problem
    #[error("Configuration error: {message}")]
    #[diagnostic(code(eksaddon::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Input file could not be parsed
    #[error("Invalid input: {message}")]
    #[diagnostic(code(eksaddon::cli::input))]
    Input { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(eksaddon::cli::io))]
    Io { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(eksaddon::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } | CliError::ValidationFailed { .. } => {
                exit_codes::VALIDATION_ERROR
            }
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Input { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a validation error with help text
    pub fn validation_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Wrap a provider configuration failure
    pub fn config(err: CoreError) -> Self {
        match err {
            CoreError::Io(e) => e.into(),
            other => Self::Config {
                message: other.to_string(),
                help: Some(
                    "Check the file passed with --provider (or EKSADDON_PROVIDER)".to_string(),
                ),
            },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedId { .. } => Self::validation_with_help(
                err.to_string(),
                "Resource IDs look like my-cluster:vpc-cni",
            ),
            CoreError::AmbiguousTags { .. } => Self::validation_with_help(
                err.to_string(),
                "Remove the duplicated tags from the spec or change their values",
            ),
            CoreError::InvalidConfig { .. } => Self::config(err),
            CoreError::YamlParse(_) | CoreError::JsonParse(_) => Self::Input {
                message: err.to_string(),
            },
            CoreError::Io(e) => e.into(),
            other => Self::Validation {
                message: other.to_string(),
                help: None,
            },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::internal(err.to_string())
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
