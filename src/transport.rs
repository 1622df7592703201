//! The transport collaborator interface.
//!
//! The envelope never talks to the network itself. It hands a fully resolved
//! [`Descriptor`] to a [`Transport`] implementation and adapts whatever comes
//! back into the unified outcome contract. A transport is expected to issue
//! exactly one request per dispatch, honor the descriptor's timeout, parse
//! JSON bodies when the descriptor's `json` flag is set, and report
//! pre-response failures as [`TransportFailure`].

use std::error::Error as StdError;

use http::{HeaderMap, StatusCode};
use serde_json::Value;

use crate::descriptor::Descriptor;

/// Response metadata produced by the transport.
///
/// The status code is the part the envelope relies on for outcome
/// classification; headers are carried through for callers.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    /// HTTP status code of the response.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
}

impl ResponseMeta {
    /// Create metadata with the given status and no headers.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
        }
    }

    /// Attach response headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// A completed exchange: the parsed body (if any) plus response metadata.
///
/// An absent body stays `None`; the envelope never coerces it into an empty
/// object.
#[derive(Debug, Clone)]
pub struct Reply {
    /// Parsed response body, if the response carried one.
    pub body: Option<Value>,
    /// Response metadata.
    pub response: ResponseMeta,
}

impl Reply {
    /// Create a reply from a body and response metadata.
    #[must_use]
    pub const fn new(body: Option<Value>, response: ResponseMeta) -> Self {
        Self { body, response }
    }
}

/// A transport-level failure: connection error, DNS failure, timeout.
///
/// The transport may still have produced response fragments before failing;
/// they travel with the error and the envelope passes them through.
#[derive(Debug)]
pub struct TransportFailure {
    /// The underlying error.
    pub source: Box<dyn StdError + Send + Sync>,
    /// Parsed body produced before the failure, if any.
    pub body: Option<Value>,
    /// Response metadata produced before the failure, if any.
    pub response: Option<ResponseMeta>,
}

impl TransportFailure {
    /// Wrap an underlying error with no response fragments.
    pub fn new(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
            body: None,
            response: None,
        }
    }

    /// Attach a body fragment produced before the failure.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach response metadata produced before the failure.
    #[must_use]
    pub fn with_response(mut self, response: ResponseMeta) -> Self {
        self.response = Some(response);
        self
    }
}

/// An HTTP transport capable of executing one resolved request descriptor.
pub trait Transport: Send + Sync {
    /// Issue the described request and resolve to its outcome.
    fn dispatch(
        &self,
        descriptor: Descriptor,
    ) -> impl Future<Output = Result<Reply, TransportFailure>> + Send;
}
