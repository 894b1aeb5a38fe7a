//! Resource types of the `infrastructure.cluster.x-k8s.io` API group.
//!
//! [`v1alpha4`] is the hub version. [`v1alpha3`] is a spoke and carries the
//! conversion logic from and to the hub.

pub mod v1alpha3;
pub mod v1alpha4;

/// The API group both versions are served in.
pub const GROUP: &str = "infrastructure.cluster.x-k8s.io";
