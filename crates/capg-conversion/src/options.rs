//! Contains available options to configure how hub data is preserved on
//! down-converted objects.
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// The annotation the serialized hub object is stored in.
pub const DEFAULT_DATA_ANNOTATION: &str = "cluster.x-k8s.io/conversion-data";

/// The annotation the digest of the down-converted object is stored in.
pub const DEFAULT_DIGEST_ANNOTATION: &str = "cluster.x-k8s.io/conversion-data-digest";

/// Kubernetes limits the total size of all annotation keys and values of an
/// object to 256 KiB.
pub const DEFAULT_MAX_ANNOTATION_BYTES: usize = 256 * 1024;

/// How a preserved payload is checked against the object it is attached to
/// before it is restored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AsRefStr, Display, Deserialize, Serialize)]
pub enum StalenessCheck {
    /// Store a digest of the down-converted object's identity and content
    /// next to the payload and only restore the payload while the digest
    /// still matches.
    #[default]
    ContentDigest,

    /// Restore any payload which is present.
    Disabled,
}

/// Specifies available preservation options.
///
/// The [`Default`] implementation contains the following values:
///
/// - The payload is stored in the `cluster.x-k8s.io/conversion-data` annotation
/// - The digest is stored in the `cluster.x-k8s.io/conversion-data-digest` annotation
/// - All annotations of a down-converted object, including the payload and the
///   digest, may be at most 256 KiB large
/// - Payloads are checked for staleness with [`StalenessCheck::ContentDigest`]
///
/// ### Example
///
/// ```
/// use capg_conversion::{ConversionOptions, StalenessCheck};
///
/// let options = ConversionOptions::builder()
///     .max_annotation_bytes(64 * 1024)
///     .staleness_check(StalenessCheck::Disabled)
///     .build();
///
/// assert_eq!(options.max_annotation_bytes, 64 * 1024);
/// ```
///
/// The options can also be embedded in a host's configuration file, where
/// every missing field falls back to its default:
///
/// ```
/// use capg_conversion::ConversionOptions;
///
/// let options: ConversionOptions =
///     serde_json::from_str(r#"{ "maxAnnotationBytes": 1024 }"#).expect("valid options");
///
/// assert_eq!(options.max_annotation_bytes, 1024);
/// assert_eq!(options.data_annotation, "cluster.x-k8s.io/conversion-data");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversionOptions {
    pub data_annotation: String,
    pub digest_annotation: String,

    /// Upper bound for the summed length of every annotation key and value
    /// once the payload is attached.
    pub max_annotation_bytes: usize,

    pub staleness_check: StalenessCheck,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ConversionOptions {
    /// Returns the default [`ConversionOptionsBuilder`] which allows to
    /// selectively customize the options.
    pub fn builder() -> ConversionOptionsBuilder {
        ConversionOptionsBuilder::default()
    }
}

/// The [`ConversionOptionsBuilder`] which allows to selectively customize
/// the [`ConversionOptions`].
///
/// Usually, this struct is not constructed manually, but instead by calling
/// [`ConversionOptions::builder()`].
#[derive(Debug, Default)]
pub struct ConversionOptionsBuilder {
    data_annotation: Option<String>,
    digest_annotation: Option<String>,
    max_annotation_bytes: Option<usize>,
    staleness_check: Option<StalenessCheck>,
}

impl ConversionOptionsBuilder {
    /// Sets the annotation the serialized hub object is stored in.
    pub fn data_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.data_annotation = Some(annotation.into());
        self
    }

    /// Sets the annotation the digest of the down-converted object is stored in.
    pub fn digest_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.digest_annotation = Some(annotation.into());
        self
    }

    /// Sets the maximum size in bytes of all annotation keys and values of a
    /// down-converted object, the preservation annotations included.
    pub fn max_annotation_bytes(mut self, max_annotation_bytes: usize) -> Self {
        self.max_annotation_bytes = Some(max_annotation_bytes);
        self
    }

    pub fn staleness_check(mut self, staleness_check: StalenessCheck) -> Self {
        self.staleness_check = Some(staleness_check);
        self
    }

    /// Builds the final [`ConversionOptions`] by using default values for any
    /// not explicitly set option.
    pub fn build(self) -> ConversionOptions {
        ConversionOptions {
            data_annotation: self
                .data_annotation
                .unwrap_or_else(|| DEFAULT_DATA_ANNOTATION.to_owned()),
            digest_annotation: self
                .digest_annotation
                .unwrap_or_else(|| DEFAULT_DIGEST_ANNOTATION.to_owned()),
            max_annotation_bytes: self.max_annotation_bytes.unwrap_or(DEFAULT_MAX_ANNOTATION_BYTES),
            staleness_check: self.staleness_check.unwrap_or_default(),
        }
    }
}
