use std::{cmp::Ordering, fmt, num::ParseIntError, str::FromStr, sync::LazyLock};

use regex::Regex;
use snafu::{OptionExt, ResultExt, Snafu};

static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v(?P<major>\d+)(?:(?P<stability>alpha|beta)(?P<minor>\d+))?$")
        .expect("failed to compile version regex")
});

/// Error variants which can be encountered when parsing a [`Version`].
#[derive(Debug, PartialEq, Snafu)]
pub enum ParseVersionError {
    #[snafu(display(
        "invalid version {input:?}, expected v<MAJOR>, v<MAJOR>alpha<LEVEL> or v<MAJOR>beta<LEVEL>"
    ))]
    InvalidFormat { input: String },

    #[snafu(display("failed to parse major version of {input:?}"))]
    ParseMajor {
        source: ParseIntError,
        input: String,
    },

    #[snafu(display("failed to parse level of {input:?}"))]
    ParseLevel {
        source: ParseIntError,
        input: String,
    },
}

/// The stability level of a pre-release schema version.
///
/// Alpha levels sort before beta levels of the same major version.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Level {
    Alpha(u64),
    Beta(u64),
}

impl Level {
    fn rank(self) -> (u8, u64) {
        match self {
            Level::Alpha(minor) => (0, minor),
            Level::Beta(minor) => (1, minor),
        }
    }
}

impl PartialOrd for Level {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Level {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Alpha(minor) => write!(f, "alpha{minor}"),
            Level::Beta(minor) => write!(f, "beta{minor}"),
        }
    }
}

/// A schema version tag, like `v1alpha3`, `v1beta1` or `v2`.
///
/// Versions are totally ordered: first by major version, then by level, where
/// a version without a level (a stable version) is the newest of its major.
///
/// ```
/// use schema_version::{Level, Version};
///
/// let version: Version = "v1alpha4".parse().expect("valid version");
/// assert_eq!(version, Version::new(1, Some(Level::Alpha(4))));
/// assert!(version < "v1beta1".parse().expect("valid version"));
/// ```
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub level: Option<Level>,
}

impl Version {
    pub fn new(major: u64, level: Option<Level>) -> Self {
        Self { major, level }
    }

    /// Returns `true` if this is a stable version (no alpha or beta level).
    pub fn is_stable(&self) -> bool {
        self.level.is_none()
    }
}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let captures = VERSION_REGEX
            .captures(input)
            .context(InvalidFormatSnafu { input })?;

        let major = captures["major"]
            .parse::<u64>()
            .context(ParseMajorSnafu { input })?;

        let level = match (captures.name("stability"), captures.name("minor")) {
            (Some(stability), Some(minor)) => {
                let minor = minor.as_str().parse().context(ParseLevelSnafu { input })?;
                match stability.as_str() {
                    "alpha" => Some(Level::Alpha(minor)),
                    _ => Some(Level::Beta(minor)),
                }
            }
            _ => None,
        };

        Ok(Self { major, level })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| match (&self.level, &other.level) {
                (Some(lhs), Some(rhs)) => lhs.cmp(rhs),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.level {
            Some(level) => write!(f, "v{major}{level}", major = self.major),
            None => write!(f, "v{major}", major = self.major),
        }
    }
}
