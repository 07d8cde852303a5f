//! Tag reconciliation
//!
//! Three tag sets exist for every resource:
//! - **configured**: the tags declared on the resource itself
//! - **default**: provider-wide tags applied to everything
//! - **effective**: defaults overlaid with configured tags, minus ignored keys
//!
//! The effective set is what should exist remotely; [`diff`] turns the gap
//! between the remote set and the effective set into a [`TagDelta`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{CoreError, Result};

/// Tag key/value mapping; ordered so that output is stable
pub type Tags = BTreeMap<String, String>;

/// Prefix reserved by AWS for its own tags
pub const RESERVED_PREFIX: &str = "aws:";

/// Maximum number of user tags on a single resource
pub const MAX_TAGS: usize = 50;

/// Maximum tag key length, in characters
pub const MAX_KEY_LENGTH: usize = 128;

/// Maximum tag value length, in characters
pub const MAX_VALUE_LENGTH: usize = 256;

/// Tags excluded from reconciliation, by exact key or by key prefix
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IgnoreTags {
    #[serde(default)]
    pub keys: BTreeSet<String>,

    #[serde(default)]
    pub key_prefixes: Vec<String>,
}

impl IgnoreTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore these exact keys
    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Ignore every key starting with one of these prefixes
    pub fn with_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_prefixes.extend(prefixes.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.key_prefixes.is_empty()
    }

    /// Check whether a key is excluded from reconciliation
    pub fn is_ignored(&self, key: &str) -> bool {
        self.keys.contains(key)
            || self
                .key_prefixes
                .iter()
                .any(|prefix| key.starts_with(prefix.as_str()))
    }

    /// Copy of `tags` without the ignored keys
    pub fn filter(&self, tags: &Tags) -> Tags {
        tags.iter()
            .filter(|(k, _)| !self.is_ignored(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Tag mutations that move a remote tag set to a desired one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagDelta {
    /// Keys missing remotely
    pub to_create: Tags,

    /// Keys present remotely with a different value
    pub to_update: Tags,

    /// Keys present remotely but no longer desired
    pub to_remove: BTreeSet<String>,
}

impl TagDelta {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_remove.is_empty()
    }

    /// Total number of key mutations
    pub fn len(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_remove.len()
    }

    /// Union of created and updated tags, sent in a single set call
    pub fn upserts(&self) -> Tags {
        self.to_create
            .iter()
            .chain(self.to_update.iter())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Apply the delta to a local tag set, removals first
    pub fn apply_to(&self, tags: &mut Tags) {
        for key in &self.to_remove {
            tags.remove(key);
        }
        tags.extend(self.upserts());
    }
}

/// Provider-level tag configuration passed to every reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPolicy {
    pub default_tags: Tags,
    pub ignore: IgnoreTags,
}

impl TagPolicy {
    pub fn new(default_tags: Tags, ignore: IgnoreTags) -> Self {
        Self {
            default_tags,
            ignore,
        }
    }

    /// Effective tags for a resource declaring `configured`
    pub fn effective_tags(&self, configured: &Tags) -> Result<Tags> {
        effective_tags(configured, &self.default_tags, &self.ignore)
    }

    /// Delta between the remote tags and the desired tags under this policy
    pub fn diff(&self, remote: &Tags, desired: &Tags) -> TagDelta {
        diff(remote, desired, &self.ignore)
    }

    /// Reconstruct (configured, effective) from tags read off a remote resource.
    ///
    /// Ignored keys are dropped from both views, and a key whose value equals
    /// the provider default for that key is attributed to the provider.
    pub fn import_view(&self, remote: &Tags) -> (Tags, Tags) {
        let tags_all = self.ignore.filter(remote);
        let configured = tags_all
            .iter()
            .filter(|(k, v)| self.default_tags.get(*k) != Some(*v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        (configured, tags_all)
    }
}

/// Resolve the tag set that should exist on the remote resource.
///
/// Defaults are overlaid with configured tags (configured wins), then ignored
/// keys are dropped. Declaring the same key with the same value at both levels
/// is rejected with [`CoreError::AmbiguousTags`].
pub fn effective_tags(configured: &Tags, defaults: &Tags, ignore: &IgnoreTags) -> Result<Tags> {
    check_ambiguous(configured, defaults)?;

    let mut merged = defaults.clone();
    merged.extend(configured.iter().map(|(k, v)| (k.clone(), v.clone())));

    Ok(ignore.filter(&merged))
}

/// Reject keys declared with identical values in both configured and default tags
pub fn check_ambiguous(configured: &Tags, defaults: &Tags) -> Result<()> {
    let duplicated: Vec<String> = configured
        .iter()
        .filter(|(k, v)| defaults.get(*k) == Some(*v))
        .map(|(k, _)| k.clone())
        .collect();

    if duplicated.is_empty() {
        Ok(())
    } else {
        Err(CoreError::AmbiguousTags { keys: duplicated })
    }
}

/// Compute the mutations that turn `remote` into `desired`.
///
/// Remote keys that are ignored are never scheduled for removal.
pub fn diff(remote: &Tags, desired: &Tags, ignore: &IgnoreTags) -> TagDelta {
    let mut delta = TagDelta::default();

    for (key, value) in desired {
        match remote.get(key) {
            None => {
                delta.to_create.insert(key.clone(), value.clone());
            }
            Some(current) if current != value => {
                delta.to_update.insert(key.clone(), value.clone());
            }
            Some(_) => {}
        }
    }

    delta.to_remove = remote
        .keys()
        .filter(|k| !desired.contains_key(*k) && !ignore.is_ignored(k))
        .cloned()
        .collect();

    delta
}

/// Check tags against the AWS tagging constraints
pub fn validate_tags(tags: &Tags) -> Result<()> {
    if tags.len() > MAX_TAGS {
        return Err(CoreError::InvalidTag {
            key: format!("({} tags)", tags.len()),
            reason: format!("at most {} tags are allowed per resource", MAX_TAGS),
        });
    }

    for (key, value) in tags {
        let invalid = |reason: String| CoreError::InvalidTag {
            key: key.clone(),
            reason,
        };

        let key_len = key.chars().count();
        if key_len == 0 || key_len > MAX_KEY_LENGTH {
            return Err(invalid(format!(
                "key length must be between 1 and {} characters",
                MAX_KEY_LENGTH
            )));
        }
        if key.to_ascii_lowercase().starts_with(RESERVED_PREFIX) {
            return Err(invalid(format!(
                "keys starting with '{}' are reserved",
                RESERVED_PREFIX
            )));
        }
        if value.chars().count() > MAX_VALUE_LENGTH {
            return Err(invalid(format!(
                "value must be at most {} characters",
                MAX_VALUE_LENGTH
            )));
        }
    }

    Ok(())
}
