use std::fmt::Debug;

use crate::assertions::AssertionFailure;

/// Broad classification of a [`HarnessError`].
///
/// The scenario runner uses it to report why a step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, derive_more::Display)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// An expected/actual mismatch.
    #[display("assertion")]
    Assertion,
    /// A transport-level failure (timeout, connection refused, ...).
    #[display("network")]
    Network,
    /// Invalid usage of the harness, detected before any network call.
    #[display("caller")]
    Caller,
    /// Invalid or missing configuration.
    #[display("configuration")]
    Configuration,
    /// File system failure while writing reports.
    #[display("io")]
    Io,
}

/// Errors that can occur when using the harness.
///
/// Transport failures, assertion mismatches and caller mistakes all flow through this
/// enum so a step can use `?` on any of them.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum HarnessError {
    /// HTTP client error from the underlying reqwest library.
    ///
    /// Occurs when network requests fail, timeouts occur, or connection issues arise.
    #[display("network failure: {_0}")]
    Network(reqwest::Error),

    /// An assertion on a response did not hold.
    #[display("{_0}")]
    Assertion(AssertionFailure),

    /// URL parsing error when constructing request URLs.
    UrlError(url::ParseError),

    /// Invalid HTTP header name.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// Invalid HTTP header value.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// JSON serialization error on a request payload.
    JsonValueError(serde_json::Error),

    /// I/O error, e.g. while writing a report.
    IoError(std::io::Error),

    /// Response body could not be deserialized into the requested type.
    #[display("Failed to deserialize JSON at '{path}': {error}")]
    #[from(skip)]
    JsonError {
        /// Location inside the body where deserialization failed.
        path: String,
        /// The underlying JSON error.
        error: serde_json::Error,
    },

    /// An identifier was empty or blank.
    #[display("{operation} requires a non-empty id")]
    #[from(skip)]
    EmptyId {
        /// The client operation that was called.
        operation: &'static str,
    },

    /// A required field is missing from a request payload.
    #[display("{operation} payload is missing required field '{field}'")]
    #[from(skip)]
    MissingField {
        /// The client operation that was called.
        operation: &'static str,
        /// Name of the missing field.
        field: String,
    },

    /// A request payload sets a field that only the server may assign.
    #[display("{operation} payload must not set server-assigned field '{field}'")]
    #[from(skip)]
    ServerOnlyField {
        /// The client operation that was called.
        operation: &'static str,
        /// Name of the forbidden field.
        field: String,
    },

    /// A request payload does not serialize to a JSON object.
    #[display("{operation} payload must be a JSON object, got: {value}")]
    #[from(skip)]
    NotAnObject {
        /// The client operation that was called.
        operation: &'static str,
        /// The serialized payload.
        value: serde_json::Value,
    },

    /// A scenario step read state that no earlier step recorded.
    #[display("no {what} recorded in the scenario world")]
    #[from(skip)]
    MissingState {
        /// What was expected, e.g. `response`.
        what: &'static str,
    },

    /// Invalid base URL configuration.
    #[display("Invalid base URL '{url}': {error}")]
    #[from(skip)]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        error: String,
    },

    /// Invalid base path configuration.
    #[display("Invalid base path: {error}")]
    #[from(skip)]
    InvalidBasePath {
        /// Description of why the base path is invalid.
        error: String,
    },

    /// A required configuration entry is absent.
    #[display("Missing configuration: {key}")]
    #[from(skip)]
    MissingConfig {
        /// Environment variable or flag name.
        key: &'static str,
    },

    /// A configuration entry could not be parsed.
    #[display("Invalid configuration {key}={value}: {error}")]
    #[from(skip)]
    InvalidConfig {
        /// Environment variable or flag name.
        key: &'static str,
        /// The raw value.
        value: String,
        /// Why it was rejected.
        error: String,
    },

    /// Report serialization failed.
    #[display("Report serialization error: {message}")]
    #[from(skip)]
    SerializationError {
        /// Description of the serialization failure.
        message: String,
    },
}

impl HarnessError {
    /// Classifies the error.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Network(_) => FailureKind::Network,
            Self::Assertion(_) => FailureKind::Assertion,
            Self::EmptyId { .. }
            | Self::MissingField { .. }
            | Self::ServerOnlyField { .. }
            | Self::NotAnObject { .. }
            | Self::MissingState { .. }
            | Self::JsonValueError(_)
            | Self::JsonError { .. }
            | Self::UrlError(_) => FailureKind::Caller,
            Self::InvalidHeaderName(_)
            | Self::InvalidHeaderValue(_)
            | Self::InvalidBaseUrl { .. }
            | Self::InvalidBasePath { .. }
            | Self::MissingConfig { .. }
            | Self::InvalidConfig { .. } => FailureKind::Configuration,
            Self::IoError(_) | Self::SerializationError { .. } => FailureKind::Io,
        }
    }

    /// Returns `true` for mistakes detected before any network call.
    pub fn is_caller_error(&self) -> bool {
        self.failure_kind() == FailureKind::Caller
    }
}
