//! Composite resource identifiers
//!
//! An addon is addressed by the pair (cluster name, addon name). The pair is
//! persisted as a single opaque string `cluster:addon`, which is what state
//! files, import commands and the sweeper all exchange.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Separator between the cluster and addon components of an ID.
///
/// Neither component may contain it; `AddonId::new` rejects such input.
pub const ID_SEPARATOR: char = ':';

/// Identity of an EKS addon within an account and region
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AddonId {
    cluster_name: String,
    addon_name: String,
}

impl AddonId {
    /// Build an identifier, validating both components
    pub fn new(cluster_name: impl Into<String>, addon_name: impl Into<String>) -> Result<Self> {
        let cluster_name = cluster_name.into();
        let addon_name = addon_name.into();

        validate_component("cluster name", &cluster_name)?;
        validate_component("addon name", &addon_name)?;

        Ok(Self {
            cluster_name,
            addon_name,
        })
    }

    /// Parse a persisted identifier
    pub fn parse(id: &str) -> Result<Self> {
        let malformed = || CoreError::MalformedId { id: id.to_string() };

        let parts: Vec<&str> = id.split(ID_SEPARATOR).collect();
        match parts.as_slice() {
            [cluster, addon] if !cluster.is_empty() && !addon.is_empty() => Ok(Self {
                cluster_name: (*cluster).to_string(),
                addon_name: (*addon).to_string(),
            }),
            _ => Err(malformed()),
        }
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    pub fn addon_name(&self) -> &str {
        &self.addon_name
    }

    /// Encoded string form
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Split back into owned (cluster, addon) components
    pub fn into_parts(self) -> (String, String) {
        (self.cluster_name, self.addon_name)
    }
}

fn validate_component(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(CoreError::invalid_input(field, "must not be empty"));
    }
    if value.contains(ID_SEPARATOR) {
        return Err(CoreError::invalid_input(
            field,
            format!("must not contain '{}'", ID_SEPARATOR),
        ));
    }
    Ok(())
}

impl fmt::Display for AddonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.cluster_name, ID_SEPARATOR, self.addon_name)
    }
}

impl FromStr for AddonId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for AddonId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AddonId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Encode a (cluster, addon) pair into its resource ID
pub fn create_resource_id(cluster_name: &str, addon_name: &str) -> Result<String> {
    AddonId::new(cluster_name, addon_name).map(|id| id.encode())
}

/// Decode a resource ID into its (cluster, addon) pair
pub fn parse_resource_id(id: &str) -> Result<(String, String)> {
    AddonId::parse(id).map(AddonId::into_parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_demo_addon() {
        assert_eq!(create_resource_id("demo", "vpc-cni").unwrap(), "demo:vpc-cni");
    }

    #[test]
    fn test_decode_demo_addon() {
        let (cluster, addon) = parse_resource_id("demo:vpc-cni").unwrap();
        assert_eq!(cluster, "demo");
        assert_eq!(addon, "vpc-cni");
    }

    #[test]
    fn test_round_trip() {
        let pairs = [
            ("demo", "vpc-cni"),
            ("tf-acc-test-1234", "coredns"),
            ("a", "b"),
            ("cluster/with/slashes", "kube-proxy"),
            ("ünïcode", "aws-ebs-csi-driver"),
        ];
        for (cluster, addon) in pairs {
            let id = create_resource_id(cluster, addon).unwrap();
            let (c, a) = parse_resource_id(&id).unwrap();
            assert_eq!((c.as_str(), a.as_str()), (cluster, addon));
        }
    }

    #[test]
    fn test_encode_rejects_empty() {
        assert!(matches!(
            create_resource_id("", "vpc-cni"),
            Err(CoreError::InvalidInput { .. })
        ));
        assert!(matches!(
            create_resource_id("demo", ""),
            Err(CoreError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_encode_rejects_separator() {
        let err = AddonId::new("de:mo", "vpc-cni").unwrap_err();
        assert!(
            matches!(err, CoreError::InvalidInput { ref field, .. } if field == "cluster name")
        );
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for id in ["", "onlyonepart", "a:b:c", ":vpc-cni", "demo:", ":"] {
            assert!(
                matches!(parse_resource_id(id), Err(CoreError::MalformedId { .. })),
                "expected {:?} to be rejected",
                id
            );
        }
    }

    #[test]
    fn test_serde_as_string() {
        let id = AddonId::new("demo", "vpc-cni").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"demo:vpc-cni\"");

        let parsed: AddonId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);

        assert!(serde_json::from_str::<AddonId>("\"nope\"").is_err());
    }

    #[test]
    fn test_from_str() {
        let id: AddonId = "demo:coredns".parse().unwrap();
        assert_eq!(id.cluster_name(), "demo");
        assert_eq!(id.addon_name(), "coredns");
    }
}
