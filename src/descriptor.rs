//! Transport-ready request representation and per-call options.

use core::time::Duration;

use http::{HeaderMap, Method};
use serde_json::{Map, Value};
use url::Url;

use crate::form::FormData;

/// Request body payload.
#[derive(Debug, Clone)]
pub enum Payload {
    /// A JSON value serialized as the request body.
    Json(Value),
    /// A multipart form; the transport encodes it and computes the boundary.
    Form(FormData),
}

/// The fully resolved, transport-ready representation of one request.
///
/// Owned solely by the in-flight request: it is built from a snapshot of the
/// envelope defaults at call time, so later default mutations never affect
/// it.
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// Resolved request method.
    pub method: Method,
    /// Base URL prefixed to a relative `url`, if one was resolved.
    pub base_url: Option<String>,
    /// The caller's request path (or absolute URL).
    pub url: String,
    /// Query parameters, applied for all methods.
    pub query: Option<Map<String, Value>>,
    /// Request body; present only for body-bearing methods.
    pub body: Option<Payload>,
    /// Resolved request headers.
    pub headers: HeaderMap,
    /// Per-request timeout; absent means the transport applies its own
    /// default.
    pub timeout: Option<Duration>,
    /// Forces JSON response parsing in the transport. Always set by the
    /// envelope.
    pub json: bool,
}

impl Descriptor {
    /// The full request target: `url` itself when absolute, otherwise the
    /// base URL joined with the path, tolerating redundant slashes on either
    /// side.
    #[must_use]
    pub fn target(&self) -> String {
        match &self.base_url {
            Some(base) if Url::parse(&self.url).is_err() => {
                format!(
                    "{}/{}",
                    base.trim_end_matches('/'),
                    self.url.trim_start_matches('/')
                )
            }
            _ => self.url.clone(),
        }
    }
}

/// Recognized per-call options, merged with the envelope defaults while the
/// descriptor is built.
///
/// Caller values always win over defaults; the authorization field follows
/// the precedence rules of the envelope (a non-blank value overrides even an
/// explicit `Authorization` header).
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Override the envelope's default base URL.
    pub base_url: Option<String>,
    /// Override the resolved `Authorization` header.
    pub authorization: Option<String>,
    /// Override the envelope's default timeout.
    pub timeout: Option<Duration>,
    /// Custom headers; `Content-Type` and `Accept` are defaulted if absent.
    pub headers: HeaderMap,
}

impl Options {
    /// Create empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL override.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the authorization override.
    #[must_use]
    pub fn authorization(mut self, authorization: impl Into<String>) -> Self {
        self.authorization = Some(authorization.into());
        self
    }

    /// Set the timeout override.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a custom header.
    #[must_use]
    pub fn header(mut self, name: http::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}
