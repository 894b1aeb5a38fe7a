use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use snafu::{ResultExt, Snafu, ensure};

use crate::{ParseVersionError, Version};

const MAX_GROUP_LENGTH: usize = 253;

static GROUP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)*[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$")
        .expect("failed to compile API group regex")
});

#[derive(Debug, PartialEq, Snafu)]
pub enum ParseApiVersionError {
    #[snafu(display("API group of {input:?} must not be empty"))]
    EmptyGroup { input: String },

    #[snafu(display("API group {group:?} must be a DNS subdomain of at most 253 characters"))]
    InvalidGroup { group: String },

    #[snafu(display("failed to parse version part of {input:?}"))]
    ParseVersion {
        source: ParseVersionError,
        input: String,
    },
}

/// A fully qualified API version in the `(<GROUP>/)<VERSION>` format, as found
/// in the `apiVersion` field of serialized objects, for example
/// `infrastructure.cluster.x-k8s.io/v1alpha4`.
///
/// Only the version part takes part in ordering decisions; the group merely
/// has to be a valid DNS subdomain.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct ApiVersion {
    pub group: Option<String>,
    pub version: Version,
}

impl ApiVersion {
    pub fn new(group: Option<&str>, version: Version) -> Self {
        Self {
            group: group.map(ToOwned::to_owned),
            version,
        }
    }
}

impl FromStr for ApiVersion {
    type Err = ParseApiVersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (group, version) = match input.split_once('/') {
            Some((group, version)) => {
                ensure!(!group.is_empty(), EmptyGroupSnafu { input });
                ensure!(
                    group.len() <= MAX_GROUP_LENGTH && GROUP_REGEX.is_match(group),
                    InvalidGroupSnafu { group }
                );

                (Some(group.to_owned()), version)
            }
            None => (None, input),
        };

        let version = Version::from_str(version).context(ParseVersionSnafu { input })?;
        Ok(Self { group, version })
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{group}/{version}", version = self.version),
            None => write!(f, "{version}", version = self.version),
        }
    }
}
