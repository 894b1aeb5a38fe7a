use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{Resource, ResourceExt};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use snafu::{ResultExt, ensure};

use crate::{
    options::{ConversionOptions, StalenessCheck},
    preservation::{
        DataPreservation, DeserializePayloadSnafu, AnnotationsTooLargeSnafu, PreservationError,
        SerializeForDigestSnafu, SerializeHubSnafu,
    },
};

/// Preserves hub objects as JSON in an annotation of the down-converted
/// object.
///
/// The payload omits the hub object's metadata, which is carried by the
/// down-converted object anyway. With [`StalenessCheck::ContentDigest`], a
/// SHA-256 digest of the down-converted object is stored in a second
/// annotation. The digest covers the object's name, namespace and uid and
/// everything outside of its metadata, so the payload is ignored once the
/// object is edited in its spoke version or copied onto a different object.
#[derive(Clone, Debug, Default)]
pub struct AnnotationPreservation {
    options: ConversionOptions,
}

impl AnnotationPreservation {
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    fn digest<T>(target: &T) -> Result<String, PreservationError>
    where
        T: Resource + Serialize,
    {
        let mut object = serde_json::to_value(target).context(SerializeForDigestSnafu)?;

        if let Some(object) = object.as_object_mut() {
            let meta = target.meta();
            object.insert(
                "metadata".to_owned(),
                json!({
                    "name": meta.name,
                    "namespace": meta.namespace,
                    "uid": meta.uid,
                }),
            );
        }

        let bytes = serde_json::to_vec(&object).context(SerializeForDigestSnafu)?;
        Ok(format!("{:x}", Sha256::digest(&bytes)))
    }
}

impl DataPreservation for AnnotationPreservation {
    fn marshal_data<H, T>(&self, hub: &H, target: &mut T) -> Result<(), PreservationError>
    where
        H: Serialize,
        T: Resource + Serialize,
    {
        let mut payload = serde_json::to_value(hub).context(SerializeHubSnafu)?;
        if let Some(payload) = payload.as_object_mut() {
            payload.remove("metadata");
        }

        let payload = payload.to_string();
        let digest = match self.options.staleness_check {
            StalenessCheck::ContentDigest => Some(Self::digest(target)?),
            StalenessCheck::Disabled => None,
        };

        // The API server limits all annotations together, not every single one
        let channel_keys = [&self.options.data_annotation, &self.options.digest_annotation];
        let other_bytes: usize = target
            .annotations()
            .iter()
            .filter(|(key, _)| !channel_keys.contains(key))
            .map(|(key, value)| key.len() + value.len())
            .sum();
        let channel_bytes = self.options.data_annotation.len()
            + payload.len()
            + digest
                .as_ref()
                .map_or(0, |digest| self.options.digest_annotation.len() + digest.len());

        let size = other_bytes + channel_bytes;
        let limit = self.options.max_annotation_bytes;
        ensure!(size <= limit, AnnotationsTooLargeSnafu { size, limit });

        let annotations = target.annotations_mut();
        annotations.insert(self.options.data_annotation.clone(), payload);
        match digest {
            Some(digest) => annotations.insert(self.options.digest_annotation.clone(), digest),
            None => annotations.remove(&self.options.digest_annotation),
        };

        Ok(())
    }

    fn unmarshal_data<H, T>(&self, target: &T) -> Result<Option<H>, PreservationError>
    where
        H: DeserializeOwned,
        T: Resource + Serialize,
    {
        let annotations = target.annotations();
        let Some(payload) = annotations.get(&self.options.data_annotation) else {
            return Ok(None);
        };

        if self.options.staleness_check == StalenessCheck::ContentDigest {
            let expected = annotations.get(&self.options.digest_annotation);
            let actual = Self::digest(target)?;

            if expected != Some(&actual) {
                tracing::debug!(
                    k8s.object.name = %target.name_any(),
                    k8s.object.namespace = ?target.namespace(),
                    "discarding preserved hub data, the object changed since it was preserved"
                );
                return Ok(None);
            }
        }

        let context = || DeserializePayloadSnafu {
            annotation: &self.options.data_annotation,
        };

        let mut payload: Value = serde_json::from_str(payload).with_context(|_| context())?;
        if let Some(payload) = payload.as_object_mut() {
            payload
                .entry("metadata")
                .or_insert_with(|| Value::Object(Default::default()));
        }

        let hub = serde_json::from_value(payload).with_context(|_| context())?;
        Ok(Some(hub))
    }

    /// An annotation map which only held the preservation bookkeeping is
    /// removed entirely. An empty map and a missing one are the same thing
    /// to the API server, which never persists empty annotations.
    fn strip(&self, meta: &mut ObjectMeta) {
        let Some(annotations) = meta.annotations.as_mut() else {
            return;
        };

        let had_data = annotations.remove(&self.options.data_annotation).is_some();
        let had_digest = annotations.remove(&self.options.digest_annotation).is_some();

        if (had_data || had_digest) && annotations.is_empty() {
            meta.annotations = None;
        }
    }
}
