//! Strongly-typed schema versions of a versioned resource API and the
//! hub-and-spoke routing between them.
//!
//! A resource kind is served in several schema generations. Each generation is
//! identified by a Kubernetes version tag following the
//! `v<MAJOR>(alpha<LEVEL>|beta<LEVEL>)` format. Tags form a total order, and
//! exactly one of them is designated as the hub, which every other version
//! (a spoke) converts to and from.
//!
//! ## Usage
//!
//! ```
//! use schema_version::{Route, Version, VersionSet};
//!
//! let v1alpha3: Version = "v1alpha3".parse().expect("valid version");
//! let v1alpha4: Version = "v1alpha4".parse().expect("valid version");
//! let v1beta1: Version = "v1beta1".parse().expect("valid version");
//!
//! let set = VersionSet::new(v1alpha4, [v1alpha3, v1beta1])
//!     .expect("versions are unique");
//!
//! // Spokes never convert directly into each other.
//! let route = set.route(&v1alpha3, &v1beta1).expect("both versions are known");
//! assert_eq!(route, Route::ThroughHub { hub: v1alpha4 });
//! ```
//!
//! Fully qualified API versions (`<GROUP>/<VERSION>`) are parsed with
//! [`ApiVersion`].

// rstest_reuse templates need the crate in scope of the test module tree.
#[cfg(test)]
use rstest_reuse::{self};

mod api_version;
mod set;
mod version;

pub use api_version::*;
pub use set::*;
pub use version::*;
