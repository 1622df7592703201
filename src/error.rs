//! Unified error types for the request envelope.
//!
//! Every failed request resolves to exactly one [`Error`] variant:
//! - request-construction errors (an empty or unsupported method string),
//!   detected before the transport is ever invoked;
//! - transport failures (connection errors, timeouts and similar
//!   pre-response faults), wrapping whatever the transport reported;
//! - remote errors, where the far endpoint answered with a 4xx/5xx status
//!   and the error message was extracted from the response body.
//!
//! [`Error::kind`] and [`Error::code`] expose the classification as stable
//! labels for logging and matching.

use std::error::Error as StdError;

use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::transport::ResponseMeta;

/// Unified error type for all envelope operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The method string was empty or blank.
    #[error("missing or invalid method type")]
    InvalidMethod,

    /// The method string named a method the envelope does not support.
    #[error(
        "unsupported method type \"{method}\" - expected one of: HEAD, GET, POST, PUT, PATCH, DELETE"
    )]
    UnsupportedMethod {
        /// The normalized (trimmed, upper-cased) method that was rejected.
        method: String,
    },

    /// The transport failed before a usable response was produced.
    ///
    /// Covers connection failures, DNS errors and timeouts. Any body or
    /// response fragments the transport managed to produce are passed
    /// through; absent values are `None`.
    #[error("transport error: {source}")]
    Transport {
        /// The underlying transport error.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
        /// Parsed body delivered alongside the failure, if any.
        body: Option<Value>,
        /// Response metadata delivered alongside the failure, if any.
        response: Option<ResponseMeta>,
    },

    /// The remote endpoint reported an application error (4xx/5xx status).
    #[error("remote error {status}: {message}")]
    Remote {
        /// HTTP status code attached to the error.
        status: StatusCode,
        /// Message extracted from the response body.
        message: String,
        /// The raw response body, kept for callers that want to inspect or
        /// deserialize it.
        body: Option<Value>,
        /// Response metadata for the error response.
        response: ResponseMeta,
    },
}

impl Error {
    /// The error category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMethod | Self::UnsupportedMethod { .. } => ErrorKind::Request,
            Self::Transport { .. } => ErrorKind::Server,
            Self::Remote { .. } => ErrorKind::Remote,
        }
    }

    /// The construction-error code, for request-kind errors.
    #[must_use]
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::InvalidMethod => Some(ErrorCode::InvalidMethod),
            Self::UnsupportedMethod { .. } => Some(ErrorCode::UnsupportedMethod),
            Self::Transport { .. } | Self::Remote { .. } => None,
        }
    }

    /// Check if this is a request-construction error.
    #[must_use]
    pub const fn is_request_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Request)
    }

    /// Check if this is a transport failure.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Check if this is an error reported by the remote endpoint.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// The HTTP status code attached to the error, if one exists.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::Transport { response, .. } => response.as_ref().map(|meta| meta.status),
            Self::InvalidMethod | Self::UnsupportedMethod { .. } => None,
        }
    }

    /// Response metadata delivered with the error, if any.
    #[must_use]
    pub const fn response(&self) -> Option<&ResponseMeta> {
        match self {
            Self::Remote { response, .. } => Some(response),
            Self::Transport { response, .. } => response.as_ref(),
            Self::InvalidMethod | Self::UnsupportedMethod { .. } => None,
        }
    }

    /// The raw body delivered with the error, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        match self {
            Self::Remote { body, .. } | Self::Transport { body, .. } => body.as_ref(),
            Self::InvalidMethod | Self::UnsupportedMethod { .. } => None,
        }
    }

    /// Attempt to deserialize the remote error body as a specific type.
    ///
    /// Useful for APIs that return structured error responses.
    ///
    /// # Example
    /// ```no_run
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct ApiError {
    ///     error: String,
    /// }
    ///
    /// # fn handle(error: envelope::Error) {
    /// if let Some(api_error) = error.deserialize_remote_error::<ApiError>() {
    ///     eprintln!("{}", api_error.error);
    /// }
    /// # }
    /// ```
    #[must_use]
    pub fn deserialize_remote_error<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        match self {
            Self::Remote { body: Some(body), .. } => serde_json::from_value(body.clone()).ok(),
            _ => None,
        }
    }
}

/// Error category labels, surfaced to callers as stable lowercase strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Request-construction error; the transport was never invoked.
    Request,
    /// Transport failure before a usable response.
    Server,
    /// Error reported by the remote endpoint.
    Remote,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Request => write!(f, "request"),
            Self::Server => write!(f, "server"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// Construction-error codes distinguishing the request-kind failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Empty or blank method string.
    InvalidMethod,
    /// Method string outside the supported set.
    UnsupportedMethod,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMethod => write!(f, "invalid_method"),
            Self::UnsupportedMethod => write!(f, "unsupported_method"),
        }
    }
}
