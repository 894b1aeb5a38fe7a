use std::collections::BTreeSet;

use snafu::{OptionExt, Snafu, ensure};
use strum::{AsRefStr, Display};

use crate::Version;

#[derive(Debug, PartialEq, Snafu)]
pub enum VersionSetError {
    #[snafu(display("version {version} is declared more than once"))]
    DuplicateVersion { version: Version },

    #[snafu(display("version {version} is not part of this version set"))]
    UnknownVersion { version: Version },
}

/// The role a version plays in a hub-and-spoke conversion topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Hub,
    Spoke,
}

/// The converter calls needed to get from one version to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// Source and target are the same version.
    Noop,

    /// Up-conversion from a spoke into the hub.
    ToHub,

    /// Down-conversion from the hub into a spoke.
    FromHub,

    /// Spoke to spoke: up into the hub, then down into the target.
    ThroughHub { hub: Version },
}

impl Route {
    /// The number of converter invocations this route takes.
    pub fn steps(&self) -> usize {
        match self {
            Route::Noop => 0,
            Route::ToHub | Route::FromHub => 1,
            Route::ThroughHub { .. } => 2,
        }
    }
}

/// The versions a resource kind is served in, with exactly one of them being
/// the hub.
///
/// Only spoke↔hub converters exist. Every other pair of versions is connected
/// through the hub, which keeps the number of converters linear in the number
/// of versions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionSet {
    hub: Version,
    versions: BTreeSet<Version>,
}

impl VersionSet {
    /// Creates a new set from the `hub` and its `spokes`.
    ///
    /// Fails if a version is declared twice, including a spoke which equals
    /// the hub.
    pub fn new(
        hub: Version,
        spokes: impl IntoIterator<Item = Version>,
    ) -> Result<Self, VersionSetError> {
        let mut versions = BTreeSet::from([hub]);

        for version in spokes {
            ensure!(versions.insert(version), DuplicateVersionSnafu { version });
        }

        Ok(Self { hub, versions })
    }

    pub fn hub(&self) -> Version {
        self.hub
    }

    pub fn contains(&self, version: &Version) -> bool {
        self.versions.contains(version)
    }

    /// Returns the role of `version`, or [`None`] if it is not part of the set.
    pub fn role(&self, version: &Version) -> Option<Role> {
        if *version == self.hub {
            Some(Role::Hub)
        } else if self.contains(version) {
            Some(Role::Spoke)
        } else {
            None
        }
    }

    /// Iterates over all versions, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Version> {
        self.versions.iter()
    }

    /// Iterates over all spoke versions, oldest first.
    pub fn spokes(&self) -> impl Iterator<Item = &Version> {
        self.versions.iter().filter(|version| **version != self.hub)
    }

    /// Plans the conversion from `from` into `to`.
    pub fn route(&self, from: &Version, to: &Version) -> Result<Route, VersionSetError> {
        let from_role = self
            .role(from)
            .context(UnknownVersionSnafu { version: *from })?;
        let to_role = self.role(to).context(UnknownVersionSnafu { version: *to })?;

        let route = match (from_role, to_role) {
            _ if from == to => Route::Noop,
            (Role::Spoke, Role::Hub) => Route::ToHub,
            (Role::Hub, Role::Spoke) => Route::FromHub,
            (Role::Spoke, Role::Spoke) => Route::ThroughHub { hub: self.hub },
            // A set has exactly one hub, so two distinct hub versions can't exist
            (Role::Hub, Role::Hub) => Route::Noop,
        };

        Ok(route)
    }
}
