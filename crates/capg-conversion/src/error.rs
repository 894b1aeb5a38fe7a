use std::error::Error as _;

use schema_version::{ParseApiVersionError, ParseVersionError, VersionSetError};
use snafu::Snafu;
use strum::{AsRefStr, Display};

use crate::preservation::PreservationError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The coarse classification of an [`Error`], independent of where in the
/// conversion it was raised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display)]
pub enum ErrorKind {
    /// A nested entity, field or collection conversion step could not complete.
    ConversionFailed,

    /// The hub payload could not be preserved on a down-converted object.
    PreservationFailed,

    /// The input handed to an entry point was missing, malformed or of the
    /// wrong type.
    InvalidInput,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("failed to convert {entity}: {reason}"))]
    ConversionFailed { entity: &'static str, reason: String },

    #[snafu(display("failed to convert element {index} of {collection}"))]
    ConvertElement {
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
        collection: &'static str,
        index: usize,
    },

    #[snafu(display("failed to convert entry {key:?} of {collection}"))]
    ConvertEntry {
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
        collection: &'static str,
        key: String,
    },

    #[snafu(display("failed to preserve hub data on {object}"))]
    PreservationFailed {
        source: PreservationError,
        object: String,
    },

    #[snafu(display("invalid input: {reason}"))]
    InvalidInput { reason: String },

    #[snafu(display("object has no {field:?} field"))]
    MissingField { field: &'static str },

    #[snafu(display("the {field:?} field of the object isn't a string"))]
    FieldNotString { field: &'static str },

    #[snafu(display("cannot convert objects of kind {kind:?}, only {expected:?}"))]
    WrongKind { kind: String, expected: String },

    #[snafu(display("API version {api_version:?} is not part of group {expected:?}"))]
    WrongGroup {
        api_version: String,
        expected: String,
    },

    #[snafu(display("failed to parse API version {api_version:?}"))]
    ParseApiVersion {
        source: ParseApiVersionError,
        api_version: String,
    },

    #[snafu(display("failed to parse version {version:?} of a registered type"))]
    ParseRegisteredVersion {
        source: ParseVersionError,
        version: String,
    },

    #[snafu(display("invalid set of registered versions"))]
    RegisterVersion { source: VersionSetError },

    #[snafu(display("no conversion route between the requested versions"))]
    UnknownVersion { source: VersionSetError },

    #[snafu(display("failed to deserialize object of API version {api_version:?}"))]
    DeserializeObject {
        source: serde_json::Error,
        api_version: String,
    },

    #[snafu(display("failed to serialize object of API version {api_version:?}"))]
    SerializeObject {
        source: serde_json::Error,
        api_version: String,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConvertElement { source, .. } | Error::ConvertEntry { source, .. } => {
                source.kind()
            }
            Error::ConversionFailed { .. } | Error::SerializeObject { .. } => {
                ErrorKind::ConversionFailed
            }
            Error::PreservationFailed { .. } => ErrorKind::PreservationFailed,
            Error::InvalidInput { .. }
            | Error::MissingField { .. }
            | Error::FieldNotString { .. }
            | Error::WrongKind { .. }
            | Error::WrongGroup { .. }
            | Error::ParseApiVersion { .. }
            | Error::ParseRegisteredVersion { .. }
            | Error::RegisterVersion { .. }
            | Error::UnknownVersion { .. }
            | Error::DeserializeObject { .. } => ErrorKind::InvalidInput,
        }
    }

    /// The HTTP status code reported back to the API server.
    pub fn http_status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::InvalidInput => 400,
            ErrorKind::ConversionFailed | ErrorKind::PreservationFailed => 500,
        }
    }

    /// Renders this error and all of its sources as a single line.
    pub fn join_errors(&self) -> String {
        let mut messages = vec![self.to_string()];

        let mut source = self.source();
        while let Some(err) = source {
            messages.push(err.to_string());
            source = err.source();
        }

        messages.join(": ")
    }
}
