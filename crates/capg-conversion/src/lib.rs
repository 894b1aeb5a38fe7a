//! Conversion between the served schema versions of the `GCPCluster`
//! resource.
//!
//! `v1alpha4` is the hub version. Every other version (a spoke) only knows how
//! to convert itself to and from the hub, see [`Convertible`]. Conversions
//! between two spokes go through the hub.
//!
//! Down-conversion into a spoke is lossy, because spokes can't express every
//! hub field. The [`Adapter`] therefore stores the complete hub object on
//! every down-converted object using a [`DataPreservation`] channel, and
//! restores the lost fields when the object is converted back up. The
//! default channel, [`AnnotationPreservation`], uses annotations and detects
//! payloads which went stale because the object was edited in the meantime.
//!
//! ```
//! use capg_conversion::{
//!     Adapter,
//!     api::{v1alpha3, v1alpha4},
//! };
//!
//! let adapter = Adapter::new(Default::default());
//! let mut hub = v1alpha4::GCPCluster::new("capg", v1alpha4::GCPClusterSpec {
//!     project: "my-project".to_owned(),
//!     region: "us-central1".to_owned(),
//!     ..Default::default()
//! });
//! hub.spec.network.subnets.push(v1alpha4::SubnetSpec {
//!     name: "nodes".to_owned(),
//!     cidr_block: "10.0.0.0/24".to_owned(),
//!     region: "us-central1".to_owned(),
//!     purpose: Some("PRIVATE".to_owned()),
//!     ..Default::default()
//! });
//!
//! let spoke: v1alpha3::GCPCluster = adapter.convert_from(&hub).expect("hub fits into v1alpha3");
//! let restored: v1alpha4::GCPCluster = adapter.convert_to(&spoke).expect("v1alpha3 fits into hub");
//!
//! assert_eq!(restored, hub);
//! ```
//!
//! Webhooks which receive raw [`ConversionReview`][kube::core::conversion::ConversionReview]s
//! use the [`Dispatcher`] instead.

mod adapter;
mod collection;
mod dispatch;
mod error;
mod field;
mod options;
mod preservation;

pub mod api;

pub use adapter::*;
pub use dispatch::*;
pub use error::*;
pub use options::*;
pub use preservation::*;
