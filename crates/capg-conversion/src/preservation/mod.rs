//! The side channel which keeps the full hub representation of an object alive
//! while the object is stored in a less expressive spoke version.
//!
//! When the hub is down-converted, fields the spoke can't express are lost.
//! A [`DataPreservation`] implementation stores the serialized hub object on
//! the spoke object itself, so that the next up-conversion can restore those
//! fields.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;
use serde::{Serialize, de::DeserializeOwned};
use snafu::Snafu;

mod annotation;

pub use annotation::AnnotationPreservation;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PreservationError {
    #[snafu(display("failed to serialize hub object"))]
    SerializeHub { source: serde_json::Error },

    #[snafu(display(
        "annotations would be {size} bytes large with the preserved hub object, exceeding the limit of {limit} bytes"
    ))]
    AnnotationsTooLarge { size: usize, limit: usize },

    #[snafu(display("failed to serialize object to compute its digest"))]
    SerializeForDigest { source: serde_json::Error },

    #[snafu(display("failed to deserialize preserved hub object from annotation {annotation:?}"))]
    DeserializePayload {
        source: serde_json::Error,
        annotation: String,
    },
}

/// Stores and restores the hub representation of down-converted objects.
pub trait DataPreservation {
    /// Serializes `hub` and attaches it to the metadata of `target`, the
    /// object `hub` was just down-converted into.
    fn marshal_data<H, T>(&self, hub: &H, target: &mut T) -> Result<(), PreservationError>
    where
        H: Serialize,
        T: Resource + Serialize;

    /// Returns the hub object preserved on `target`.
    ///
    /// Returns [`None`] if there is no payload, or if the payload doesn't
    /// belong to the current state of `target` anymore.
    fn unmarshal_data<H, T>(&self, target: &T) -> Result<Option<H>, PreservationError>
    where
        H: DeserializeOwned,
        T: Resource + Serialize;

    /// Removes all preservation bookkeeping from `meta`.
    ///
    /// Implementations may leave `meta.annotations` as [`None`] instead of an
    /// empty map.
    fn strip(&self, meta: &mut ObjectMeta);
}
