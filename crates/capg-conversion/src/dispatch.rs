//! Converts untyped objects between the registered versions of a resource.
//!
//! The [`Dispatcher`] is what a conversion webhook plugs into: it receives raw
//! JSON objects together with the desired API version, picks the typed
//! converters of the source and target version, and routes the conversion
//! through the hub. [`Dispatcher::handle`] answers complete
//! [`ConversionReview`]s.

use std::{collections::BTreeMap, marker::PhantomData};

use kube::{
    Resource,
    core::{
        conversion::{ConversionRequest, ConversionResponse, ConversionReview},
        response::{Status, StatusSummary},
    },
};
use schema_version::{ApiVersion, Version, VersionSet, VersionSetError};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use snafu::{OptionExt, ResultExt, ensure};
use tracing::instrument;

use crate::{
    adapter::{Adapter, Convertible, Hub},
    collection,
    error::{
        DeserializeObjectSnafu, FieldNotStringSnafu, InvalidInputSnafu, MissingFieldSnafu,
        ParseApiVersionSnafu, ParseRegisteredVersionSnafu, RegisterVersionSnafu, Result,
        SerializeObjectSnafu, UnknownVersionSnafu, WrongGroupSnafu, WrongKindSnafu,
    },
    preservation::{AnnotationPreservation, DataPreservation},
};

/// Converts JSON objects of kind `H` between all registered versions.
///
/// ```
/// use capg_conversion::{
///     Adapter, Dispatcher,
///     api::{v1alpha3, v1alpha4},
/// };
/// use serde_json::json;
///
/// let dispatcher = Dispatcher::<v1alpha4::GCPCluster>::builder(Adapter::new(Default::default()))
///     .add_spoke::<v1alpha3::GCPCluster>()
///     .build()
///     .expect("versions are unique");
///
/// let converted = dispatcher
///     .convert(
///         json!({
///             "apiVersion": "infrastructure.cluster.x-k8s.io/v1alpha3",
///             "kind": "GCPCluster",
///             "metadata": { "name": "capg" },
///             "spec": { "project": "my-project", "region": "us-central1" },
///         }),
///         "infrastructure.cluster.x-k8s.io/v1alpha4",
///     )
///     .expect("object is valid");
///
/// assert_eq!(converted["apiVersion"], "infrastructure.cluster.x-k8s.io/v1alpha4");
/// ```
pub struct Dispatcher<H, P = AnnotationPreservation> {
    adapter: Adapter<P>,
    group: Option<String>,
    kind: String,
    versions: VersionSet,
    converters: BTreeMap<Version, Box<dyn ErasedVersion<H, P>>>,
}

impl<H, P> Dispatcher<H, P>
where
    H: Hub + Clone + Resource<DynamicType = ()> + Serialize + DeserializeOwned + 'static,
    P: DataPreservation,
{
    /// Starts building a dispatcher for the hub `H`, which converts objects
    /// with `adapter`.
    pub fn builder(adapter: Adapter<P>) -> DispatcherBuilder<H, P> {
        DispatcherBuilder {
            adapter,
            hub: Box::new(TypedVersion::<H>::new()),
            spokes: Vec::new(),
        }
    }
}

impl<H, P> Dispatcher<H, P> {
    pub fn versions(&self) -> &VersionSet {
        &self.versions
    }

    pub fn adapter(&self) -> &Adapter<P> {
        &self.adapter
    }

    /// Converts `object` into `desired_api_version`.
    ///
    /// Fails with an [`InvalidInput`](crate::ErrorKind::InvalidInput) error if
    /// `object` is not a JSON object of the dispatcher's kind, or if either
    /// version is not registered.
    #[instrument(skip_all, fields(
        k8s.crd.conversion.kind = %self.kind,
        k8s.crd.conversion.desired_api_version = desired_api_version,
    ))]
    pub fn convert(&self, object: Value, desired_api_version: &str) -> Result<Value> {
        let Value::Object(fields) = &object else {
            return InvalidInputSnafu {
                reason: format!("expected an object, got {}", type_name(&object)),
            }
            .fail();
        };

        let kind = string_field(fields, "kind")?;
        ensure!(kind == self.kind, WrongKindSnafu {
            kind,
            expected: &self.kind,
        });

        let current = self.parse_api_version(string_field(fields, "apiVersion")?)?;
        let desired = self.parse_api_version(desired_api_version)?;

        let route = self
            .versions
            .route(&current, &desired)
            .context(UnknownVersionSnafu)?;

        if route.steps() == 0 {
            return Ok(object);
        }

        let hub = self.converter(&current)?.to_hub(&self.adapter, object)?;
        let converted = self.converter(&desired)?.from_hub(&self.adapter, &hub)?;

        tracing::trace!(
            k8s.crd.conversion.api_version = %current,
            k8s.crd.conversion.steps = route.steps(),
            "Successfully converted object"
        );

        Ok(converted)
    }

    /// Converts all `objects` into `desired_api_version`, failing on the
    /// first object which can't be converted.
    #[instrument(skip_all, err)]
    pub fn convert_objects(
        &self,
        objects: Vec<Value>,
        desired_api_version: &str,
    ) -> Result<Vec<Value>> {
        collection::convert_all("objects", objects, |object| {
            self.convert(object, desired_api_version)
        })
    }

    /// Answers a [`ConversionReview`] sent by the Kubernetes API server.
    ///
    /// The response always echoes the uid of the request. If any object fails
    /// to convert, no objects are returned and the result carries the error
    /// chain together with its HTTP status code.
    #[instrument(skip_all, fields(
        k8s.crd.conversion.api_version = review.types.api_version,
        k8s.crd.conversion.kind = review.types.kind,
    ))]
    pub fn handle(&self, review: ConversionReview) -> ConversionReview {
        let request = match ConversionRequest::from_review(review) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(?err, "received invalid conversion review");

                return ConversionResponse::invalid(Status {
                    status: Some(StatusSummary::Failure),
                    message: err.to_string(),
                    reason: err.to_string(),
                    details: None,
                    metadata: None,
                    code: 400,
                })
                .into_review();
            }
        };

        let response = match self.convert_objects(request.objects, &request.desired_api_version) {
            Ok(converted_objects) => {
                tracing::debug!(
                    k8s.crd.conversion.converted_object_count = converted_objects.len(),
                    "Successfully converted objects"
                );

                ConversionResponse {
                    result: Status::success(),
                    types: request.types,
                    uid: request.uid,
                    converted_objects,
                }
            }
            Err(err) => {
                let message = err.join_errors();

                ConversionResponse {
                    result: Status {
                        status: Some(StatusSummary::Failure),
                        message,
                        reason: err.kind().to_string(),
                        details: None,
                        metadata: None,
                        code: err.http_status_code(),
                    },
                    types: request.types,
                    uid: request.uid,
                    converted_objects: vec![],
                }
            }
        };

        response.into_review()
    }

    fn parse_api_version(&self, api_version: &str) -> Result<Version> {
        let parsed: ApiVersion = api_version
            .parse()
            .context(ParseApiVersionSnafu { api_version })?;

        ensure!(parsed.group == self.group, WrongGroupSnafu {
            api_version,
            expected: self.group.as_deref().unwrap_or_default(),
        });

        Ok(parsed.version)
    }

    fn converter(&self, version: &Version) -> Result<&dyn ErasedVersion<H, P>> {
        match self.converters.get(version) {
            Some(converter) => Ok(converter.as_ref()),
            None => Err(VersionSetError::UnknownVersion { version: *version })
                .context(UnknownVersionSnafu),
        }
    }
}

/// Collects the spoke versions of a [`Dispatcher`].
pub struct DispatcherBuilder<H, P = AnnotationPreservation> {
    adapter: Adapter<P>,
    hub: Box<dyn ErasedVersion<H, P>>,
    spokes: Vec<(String, Box<dyn ErasedVersion<H, P>>)>,
}

impl<H, P> DispatcherBuilder<H, P>
where
    H: Hub + Resource<DynamicType = ()> + Serialize + DeserializeOwned + 'static,
    P: DataPreservation,
{
    /// Registers the spoke type `R`, served under its own version.
    pub fn add_spoke<R>(mut self) -> Self
    where
        R: Convertible<H> + Resource<DynamicType = ()> + Serialize + DeserializeOwned + 'static,
    {
        let converter: Box<dyn ErasedVersion<H, P>> = Box::new(TypedVersion::<R>::new());
        self.spokes.push((R::version(&()).into_owned(), converter));
        self
    }

    /// Builds the dispatcher. Fails if a version can't be parsed or is
    /// registered twice.
    pub fn build(self) -> Result<Dispatcher<H, P>> {
        let hub_version = H::version(&());
        let hub: Version = hub_version
            .parse()
            .context(ParseRegisteredVersionSnafu {
                version: hub_version.clone(),
            })?;

        let mut spokes = Vec::with_capacity(self.spokes.len());
        for (version, converter) in self.spokes {
            let parsed: Version = version
                .parse()
                .context(ParseRegisteredVersionSnafu { version })?;
            spokes.push((parsed, converter));
        }

        let versions = VersionSet::new(hub, spokes.iter().map(|(version, _)| *version))
            .context(RegisterVersionSnafu)?;

        let mut converters = BTreeMap::from([(hub, self.hub)]);
        converters.extend(spokes);

        let group = H::group(&());

        Ok(Dispatcher {
            adapter: self.adapter,
            group: (!group.is_empty()).then(|| group.into_owned()),
            kind: H::kind(&()).into_owned(),
            versions,
            converters,
        })
    }
}

/// Converts the objects of a single version without knowing its type.
trait ErasedVersion<H, P>: Send + Sync {
    fn to_hub(&self, adapter: &Adapter<P>, object: Value) -> Result<H>;
    fn from_hub(&self, adapter: &Adapter<P>, hub: &H) -> Result<Value>;
}

struct TypedVersion<R>(PhantomData<fn() -> R>);

impl<R> TypedVersion<R> {
    fn new() -> Self {
        Self(PhantomData)
    }
}

impl<R, H, P> ErasedVersion<H, P> for TypedVersion<R>
where
    R: Convertible<H> + Resource<DynamicType = ()> + Serialize + DeserializeOwned,
    H: Hub + Resource<DynamicType = ()> + Serialize + DeserializeOwned,
    P: DataPreservation,
{
    fn to_hub(&self, adapter: &Adapter<P>, object: Value) -> Result<H> {
        let object: R = serde_json::from_value(object).context(DeserializeObjectSnafu {
            api_version: R::api_version(&()),
        })?;

        adapter.convert_to(&object)
    }

    fn from_hub(&self, adapter: &Adapter<P>, hub: &H) -> Result<Value> {
        let object: R = adapter.convert_from(hub)?;

        serde_json::to_value(&object).context(SerializeObjectSnafu {
            api_version: R::api_version(&()),
        })
    }
}

fn string_field<'a>(
    fields: &'a serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<&'a str> {
    fields
        .get(field)
        .context(MissingFieldSnafu { field })?
        .as_str()
        .context(FieldNotStringSnafu { field })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
