//! ARN parsing for addons and IAM roles

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::error::{CoreError, Result};

static ADDON_ARN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^arn:(?P<partition>[^:]+):eks:(?P<region>[^:]+):(?P<account>\d{12}):addon/(?P<cluster>[^/]+)/(?P<addon>[^/]+)/(?P<suffix>.+)$",
    )
    .expect("addon ARN pattern is valid")
});

static ROLE_ARN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^arn:[^:]+:iam::\d{12}:role/.+$").expect("role ARN pattern is valid")
});

/// Parsed ARN of an EKS addon
///
/// Format: `arn:<partition>:eks:<region>:<account>:addon/<cluster>/<addon>/<suffix>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonArn {
    pub partition: String,
    pub region: String,
    pub account_id: String,
    pub cluster_name: String,
    pub addon_name: String,
    pub suffix: String,
}

impl AddonArn {
    pub fn parse(arn: &str) -> Result<Self> {
        let caps = ADDON_ARN.captures(arn).ok_or_else(|| CoreError::InvalidArn {
            arn: arn.to_string(),
            reason: "expected arn:<partition>:eks:<region>:<account>:addon/<cluster>/<addon>/<id>"
                .to_string(),
        })?;

        Ok(Self {
            partition: caps["partition"].to_string(),
            region: caps["region"].to_string(),
            account_id: caps["account"].to_string(),
            cluster_name: caps["cluster"].to_string(),
            addon_name: caps["addon"].to_string(),
            suffix: caps["suffix"].to_string(),
        })
    }
}

impl fmt::Display for AddonArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:eks:{}:{}:addon/{}/{}/{}",
            self.partition,
            self.region,
            self.account_id,
            self.cluster_name,
            self.addon_name,
            self.suffix
        )
    }
}

/// Validate an IAM role ARN, as used for service account roles
pub fn validate_role_arn(arn: &str) -> Result<()> {
    if ROLE_ARN.is_match(arn) {
        Ok(())
    } else {
        Err(CoreError::InvalidArn {
            arn: arn.to_string(),
            reason: "expected an IAM role ARN (arn:<partition>:iam::<account>:role/<name>)"
                .to_string(),
        })
    }
}
