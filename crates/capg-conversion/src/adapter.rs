//! Object-level conversion between a hub version and its spokes.
//!
//! The [`Convertible`] trait holds the entity-level conversion of a single
//! spoke type, while the [`Adapter`] sequences it with the
//! [`DataPreservation`] channel: every down-converted object carries its hub
//! representation, and every up-conversion restores what the spoke couldn't
//! express.

use kube::{Resource, ResourceExt};
use serde::{Serialize, de::DeserializeOwned};
use snafu::ResultExt;
use tracing::instrument;

use crate::{
    error::{PreservationFailedSnafu, Result},
    options::ConversionOptions,
    preservation::{AnnotationPreservation, DataPreservation},
};

/// Marks the canonical version of a resource, which every other version
/// converts to and from.
pub trait Hub {}

/// Converts a spoke type to and from its hub type `H`.
///
/// Implementations only map fields. Hub-only fields are left unset by
/// [`Convertible::to_hub`] and are dropped by [`Convertible::from_hub`].
/// Recovering them is the job of [`Convertible::restore`], which the
/// [`Adapter`] calls with the hub object preserved on the spoke.
pub trait Convertible<H: Hub>: Sized {
    /// Whether `Self` is the hub type itself. Identity conversions neither
    /// preserve nor restore anything.
    const IDENTITY: bool = false;

    /// Up-converts `self` into a fresh hub object.
    fn to_hub(&self) -> Result<H>;

    /// Down-converts `hub` into a fresh object of this version.
    fn from_hub(hub: &H) -> Result<Self>;

    /// Copies fields this version can't express from `preserved` onto the
    /// freshly up-converted `hub`.
    fn restore(_hub: &mut H, _preserved: H) {}
}

impl<H> Convertible<H> for H
where
    H: Hub + Clone,
{
    const IDENTITY: bool = true;

    fn to_hub(&self) -> Result<H> {
        Ok(self.clone())
    }

    fn from_hub(hub: &H) -> Result<Self> {
        Ok(hub.clone())
    }
}

/// Converts objects between a hub and its spokes, preserving hub data on
/// down-converted objects via `P`.
///
/// The adapter holds no per-conversion state and can be shared between
/// threads if `P` can.
#[derive(Clone, Debug)]
pub struct Adapter<P = AnnotationPreservation> {
    preservation: P,
}

impl Adapter {
    /// Creates an adapter which preserves hub data in annotations configured
    /// by `options`.
    pub fn new(options: ConversionOptions) -> Self {
        Self {
            preservation: AnnotationPreservation::new(options),
        }
    }
}

impl Default for Adapter {
    fn default() -> Self {
        Self::new(ConversionOptions::default())
    }
}

impl<P> Adapter<P>
where
    P: DataPreservation,
{
    pub fn with_preservation(preservation: P) -> Self {
        Self { preservation }
    }

    pub fn preservation(&self) -> &P {
        &self.preservation
    }

    /// Up-converts `src` into its hub version.
    ///
    /// Hub-only fields are restored on a best-effort basis from the hub
    /// object preserved on `src`. A missing, stale or unreadable payload is
    /// ignored. The preservation bookkeeping is removed from the returned hub
    /// object.
    #[instrument(skip_all, fields(
        k8s.crd.conversion.kind = %R::kind(&()),
        k8s.crd.conversion.api_version = %R::api_version(&()),
        k8s.crd.conversion.desired_api_version = %H::api_version(&()),
    ))]
    pub fn convert_to<R, H>(&self, src: &R) -> Result<H>
    where
        R: Convertible<H> + Resource<DynamicType = ()> + Serialize,
        H: Hub + Resource<DynamicType = ()> + DeserializeOwned,
    {
        let mut hub = src.to_hub()?;

        if !R::IDENTITY {
            match self.preservation.unmarshal_data::<H, _>(src) {
                Ok(Some(preserved)) => R::restore(&mut hub, preserved),
                Ok(None) => {}
                Err(err) => tracing::warn!(
                    ?err,
                    k8s.object.name = %src.name_any(),
                    "ignoring unreadable preserved hub data"
                ),
            }

            self.preservation.strip(hub.meta_mut());
        }

        tracing::trace!(k8s.object.name = %src.name_any(), "Successfully converted object");
        Ok(hub)
    }

    /// Down-converts `hub` into the spoke version `R`.
    ///
    /// The complete `hub` object is preserved on the returned object. Failing
    /// to do so fails the conversion, because the hub-only fields would
    /// otherwise be lost for good.
    #[instrument(skip_all, fields(
        k8s.crd.conversion.kind = %H::kind(&()),
        k8s.crd.conversion.api_version = %H::api_version(&()),
        k8s.crd.conversion.desired_api_version = %R::api_version(&()),
    ))]
    pub fn convert_from<R, H>(&self, hub: &H) -> Result<R>
    where
        R: Convertible<H> + Resource<DynamicType = ()> + Serialize,
        H: Hub + Resource<DynamicType = ()> + Serialize,
    {
        let mut target = R::from_hub(hub)?;

        if !R::IDENTITY {
            self.preservation
                .marshal_data(hub, &mut target)
                .with_context(|_| PreservationFailedSnafu {
                    object: object_ref(&target),
                })?;
        }

        tracing::trace!(k8s.object.name = %hub.name_any(), "Successfully converted object");
        Ok(target)
    }

    /// Up-converts a list of objects. Neither restores nor strips any
    /// preserved data.
    #[instrument(skip_all)]
    pub fn convert_list_to<R, H>(&self, src: &R) -> Result<H>
    where
        R: Convertible<H>,
        H: Hub,
    {
        src.to_hub()
    }

    /// Down-converts a list of objects. No hub data is preserved on the
    /// items.
    #[instrument(skip_all)]
    pub fn convert_list_from<R, H>(&self, hub: &H) -> Result<R>
    where
        R: Convertible<H>,
        H: Hub,
    {
        R::from_hub(hub)
    }

    /// Converts `src` into another spoke version by going through the hub `H`.
    pub fn convert_between<A, B, H>(&self, src: &A) -> Result<B>
    where
        A: Convertible<H> + Resource<DynamicType = ()> + Serialize,
        B: Convertible<H> + Resource<DynamicType = ()> + Serialize,
        H: Hub + Resource<DynamicType = ()> + Serialize + DeserializeOwned,
    {
        let hub: H = self.convert_to(src)?;
        self.convert_from(&hub)
    }
}

fn object_ref<K: Resource>(object: &K) -> String {
    match object.namespace() {
        Some(namespace) => format!("{namespace}/{name}", name = object.name_any()),
        None => object.name_any(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    use super::*;
    use crate::{
        api::{v1alpha3, v1alpha4 as hub},
        error::ErrorKind,
        preservation::PreservationError,
    };

    /// Records every call and optionally refuses to preserve anything.
    #[derive(Default)]
    struct RecordingPreservation {
        fail_marshal: bool,
        calls: Mutex<Vec<&'static str>>,
    }

    impl RecordingPreservation {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().expect("lock is never poisoned").clone()
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().expect("lock is never poisoned").push(call);
        }
    }

    impl DataPreservation for RecordingPreservation {
        fn marshal_data<H, T>(&self, _hub: &H, _target: &mut T) -> Result<(), PreservationError>
        where
            H: Serialize,
            T: Resource + Serialize,
        {
            self.record("marshal");

            if self.fail_marshal {
                return Err(PreservationError::AnnotationsTooLarge { size: 1, limit: 0 });
            }
            Ok(())
        }

        fn unmarshal_data<H, T>(&self, _target: &T) -> Result<Option<H>, PreservationError>
        where
            H: DeserializeOwned,
            T: Resource + Serialize,
        {
            self.record("unmarshal");
            Ok(None)
        }

        fn strip(&self, _meta: &mut ObjectMeta) {
            self.record("strip");
        }
    }

    fn hub_cluster() -> hub::GCPCluster {
        let mut cluster = hub::GCPCluster::new("capg", hub::GCPClusterSpec {
            project: "my-project".to_owned(),
            region: "us-central1".to_owned(),
            ..Default::default()
        });
        cluster.metadata.namespace = Some("default".to_owned());
        cluster
    }

    #[test]
    fn down_conversion_always_preserves() {
        let adapter = Adapter::with_preservation(RecordingPreservation::default());

        let _: v1alpha3::GCPCluster = adapter
            .convert_from(&hub_cluster())
            .expect("conversion succeeds");
        assert_eq!(adapter.preservation().calls(), ["marshal"]);
    }

    #[test]
    fn failing_preservation_fails_down_conversion() {
        let adapter = Adapter::with_preservation(RecordingPreservation {
            fail_marshal: true,
            ..Default::default()
        });

        let err = adapter
            .convert_from::<v1alpha3::GCPCluster, _>(&hub_cluster())
            .expect_err("preservation fails");
        assert_eq!(err.kind(), ErrorKind::PreservationFailed);
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(
            err.join_errors(),
            "failed to preserve hub data on default/capg: annotations would be 1 bytes large with the preserved hub object, exceeding the limit of 0 bytes"
        );
    }

    #[test]
    fn up_conversion_restores_and_strips() {
        let adapter = Adapter::with_preservation(RecordingPreservation::default());
        let spoke = v1alpha3::GCPCluster::new("capg", v1alpha3::GCPClusterSpec::default());

        let _: hub::GCPCluster = adapter.convert_to(&spoke).expect("conversion succeeds");
        assert_eq!(adapter.preservation().calls(), ["unmarshal", "strip"]);
    }

    #[test]
    fn identity_conversion_skips_preservation() {
        let adapter = Adapter::with_preservation(RecordingPreservation::default());
        let cluster = hub_cluster();

        let up: hub::GCPCluster = adapter.convert_to(&cluster).expect("conversion succeeds");
        let down: hub::GCPCluster = adapter.convert_from(&up).expect("conversion succeeds");

        assert_eq!(down, cluster);
        assert!(adapter.preservation().calls().is_empty());
    }

    #[test]
    fn list_conversion_skips_preservation() {
        let adapter = Adapter::with_preservation(RecordingPreservation::default());
        let list = hub::GCPClusterList {
            items: vec![hub_cluster(), hub_cluster()],
            ..Default::default()
        };

        let down: v1alpha3::GCPClusterList = adapter
            .convert_list_from(&list)
            .expect("conversion succeeds");
        let _: hub::GCPClusterList = adapter.convert_list_to(&down).expect("conversion succeeds");

        assert_eq!(down.items.len(), 2);
        assert!(adapter.preservation().calls().is_empty());
    }

    #[test]
    fn object_refs() {
        let mut cluster = hub_cluster();
        assert_eq!(object_ref(&cluster), "default/capg");

        cluster.metadata.namespace = None;
        assert_eq!(object_ref(&cluster), "capg");
    }
}
