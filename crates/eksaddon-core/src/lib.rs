//! eksaddon Core - types and algorithms for managing EKS addons
//!
//! This crate provides the pieces that do not talk to AWS:
//! - `AddonId`: the `cluster:addon` resource identifier codec
//! - `tags`: effective tag resolution and tag diffing
//! - `AddonSpec` / `Addon`: desired configuration and remote representation
//! - `AddonState`: the record persisted after each lifecycle operation
//! - `ProviderConfig`: default tags and ignore-tag policy

pub mod addon;
pub mod arn;
pub mod config;
pub mod error;
pub mod id;
pub mod state;
pub mod tags;

pub use addon::{Addon, AddonSpec, AddonStatus, ResolveConflicts, parse_addon_version};
pub use arn::{AddonArn, validate_role_arn};
pub use config::{DefaultTags, ProviderConfig};
pub use error::{CoreError, Result};
pub use id::{AddonId, ID_SEPARATOR, create_resource_id, parse_resource_id};
pub use state::AddonState;
pub use tags::{IgnoreTags, TagDelta, TagPolicy, Tags, diff, effective_tags, validate_tags};
