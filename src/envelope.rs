//! Request resolution and outcome unification.
//!
//! [`Envelope`] is the core of the crate: it validates and normalizes the
//! method, applies the body/query disambiguation rule, merges per-call
//! options with the defaults snapshot, resolves header and authorization
//! precedence, hands the finished [`Descriptor`] to the transport, and
//! classifies the transport's outcome into the unified result contract.

use core::pin::Pin;

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde_json::Value;

use crate::defaults::{Defaults, is_blank};
use crate::descriptor::{Descriptor, Options, Payload};
use crate::error::Error;
use crate::form::{FILE_FIELD, FormData, FormPart};
use crate::transport::{Reply, Transport, TransportFailure};

const APPLICATION_JSON: &str = "application/json";

/// The request envelope: normalizes call arguments, merges defaults, and
/// unifies transport outcomes.
///
/// Owns its [`Defaults`] and the transport it delegates to. Requests are
/// issued through [`request`](Self::request) or the per-method shorthands,
/// all of which return a [`RequestBuilder`] that resolves when awaited.
#[derive(Debug)]
pub struct Envelope<T: Transport> {
    transport: T,
    defaults: Defaults,
}

impl<T: Transport> Envelope<T> {
    /// Create an envelope around a transport with fresh [`Defaults`].
    pub fn new(transport: T) -> Self {
        Self::with_defaults(transport, Defaults::new())
    }

    /// Create an envelope around a transport with the given defaults.
    pub const fn with_defaults(transport: T, defaults: Defaults) -> Self {
        Self {
            transport,
            defaults,
        }
    }

    /// The current defaults.
    pub const fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Mutable access to the defaults.
    ///
    /// Changes apply to requests awaited afterwards; a request snapshots the
    /// defaults into its descriptor before the transport is invoked, so
    /// in-flight requests are unaffected.
    pub const fn defaults_mut(&mut self) -> &mut Defaults {
        &mut self.defaults
    }

    /// Start a request with an explicit method string.
    ///
    /// The method is trimmed and upper-cased when the builder is awaited;
    /// an empty string or a method outside {HEAD, GET, POST, PUT, PATCH,
    /// DELETE, UPLOAD} resolves to a request-construction error without the
    /// transport being invoked. `UPLOAD` is rewritten to POST with multipart
    /// semantics.
    pub fn request(
        &self,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> RequestBuilder<'_, T> {
        RequestBuilder {
            envelope: self,
            call: Call {
                method: method.into(),
                path: path.into(),
                data: None,
                query: None,
                file: None,
                options: Options::new(),
            },
        }
    }

    /// Start a HEAD request.
    pub fn head(&self, path: impl Into<String>) -> RequestBuilder<'_, T> {
        self.request("HEAD", path)
    }

    /// Start a GET request.
    pub fn get(&self, path: impl Into<String>) -> RequestBuilder<'_, T> {
        self.request("GET", path)
    }

    /// Start a POST request.
    pub fn post(&self, path: impl Into<String>) -> RequestBuilder<'_, T> {
        self.request("POST", path)
    }

    /// Start a PUT request.
    pub fn put(&self, path: impl Into<String>) -> RequestBuilder<'_, T> {
        self.request("PUT", path)
    }

    /// Start a PATCH request.
    pub fn patch(&self, path: impl Into<String>) -> RequestBuilder<'_, T> {
        self.request("PATCH", path)
    }

    /// Start a DELETE request.
    pub fn delete(&self, path: impl Into<String>) -> RequestBuilder<'_, T> {
        self.request("DELETE", path)
    }

    /// Start a multipart upload.
    ///
    /// The file attached with [`RequestBuilder::file`] lands under the
    /// reserved `file` form field; every key of the `data` object except a
    /// literal `file` key becomes a text field.
    pub fn upload(&self, path: impl Into<String>) -> RequestBuilder<'_, T> {
        self.request("UPLOAD", path)
    }

    async fn send(&self, call: Call) -> Result<Reply, Error> {
        let Call {
            method,
            path,
            data,
            query,
            file,
            options,
        } = call;

        let normalized = method.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(Error::InvalidMethod);
        }

        let is_upload = normalized == "UPLOAD";
        let normalized = if is_upload {
            String::from("POST")
        } else {
            normalized
        };

        let method = match normalized.as_str() {
            "HEAD" => Method::HEAD,
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "PATCH" => Method::PATCH,
            "DELETE" => Method::DELETE,
            _ => return Err(Error::UnsupportedMethod { method: normalized }),
        };

        let has_body = matches!(method.as_str(), "POST" | "PUT" | "PATCH");

        // A data value supplied for a body-less method was meant as the
        // query mapping.
        let (data, query) = if has_body || data.is_none() {
            (data, query)
        } else {
            (None, data)
        };

        let body = if is_upload {
            Some(Payload::Form(assemble_form(file, data)))
        } else if has_body {
            data.map(Payload::Json)
        } else {
            None
        };

        let defaults = &self.defaults;
        let mut descriptor = Descriptor {
            method,
            base_url: options
                .base_url
                .filter(|url| !is_blank(url))
                .or_else(|| defaults.base_url().map(str::to_owned)),
            url: path,
            query: match query {
                Some(Value::Object(map)) => Some(map),
                _ => None,
            },
            body,
            headers: options.headers,
            timeout: options.timeout.or(defaults.timeout()),
            json: true,
        };

        if is_upload {
            // The transport computes the multipart boundary itself.
            descriptor.headers.remove(CONTENT_TYPE);
        } else if blank_header(&descriptor.headers, CONTENT_TYPE) {
            descriptor
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        }
        if blank_header(&descriptor.headers, ACCEPT) {
            descriptor
                .headers
                .insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        }

        if let Some(authorization) = options
            .authorization
            .as_deref()
            .filter(|value| !is_blank(value))
        {
            if !blank_header(&descriptor.headers, AUTHORIZATION) {
                tracing::warn!(
                    "authorization specified in header data is being overridden by \
                     authorization at the root of the call options"
                );
            }
            // Values that cannot be header-encoded are treated like blank ones.
            if let Ok(value) = HeaderValue::from_str(authorization) {
                descriptor.headers.insert(AUTHORIZATION, value);
            }
        }
        if blank_header(&descriptor.headers, AUTHORIZATION) {
            if let Some(authorization) = defaults.authorization() {
                if let Ok(value) = HeaderValue::from_str(authorization) {
                    descriptor.headers.insert(AUTHORIZATION, value);
                }
            }
        }

        unify(self.transport.dispatch(descriptor).await)
    }
}

struct Call {
    method: String,
    path: String,
    data: Option<Value>,
    query: Option<Value>,
    file: Option<FormPart>,
    options: Options,
}

/// A request being assembled; resolves when awaited.
pub struct RequestBuilder<'a, T: Transport> {
    envelope: &'a Envelope<T>,
    call: Call,
}

impl<T: Transport> RequestBuilder<'_, T> {
    /// Attach the request body.
    ///
    /// For methods without body semantics (HEAD, GET, DELETE) the value is
    /// reclassified as the query mapping instead.
    #[must_use]
    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.call.data = Some(data.into());
        self
    }

    /// Attach query parameters; only object values end up on the
    /// descriptor.
    #[must_use]
    pub fn query(mut self, query: impl Into<Value>) -> Self {
        self.call.query = Some(query.into());
        self
    }

    /// Replace the per-call options wholesale.
    #[must_use]
    pub fn options(mut self, options: Options) -> Self {
        self.call.options = options;
        self
    }

    /// Override the base URL for this call.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.call.options.base_url = Some(base_url.into());
        self
    }

    /// Override the `Authorization` header for this call.
    ///
    /// A non-blank value takes precedence over an `Authorization` entry in
    /// the custom headers; blank values are ignored entirely.
    #[must_use]
    pub fn authorization(mut self, authorization: impl Into<String>) -> Self {
        self.call.options.authorization = Some(authorization.into());
        self
    }

    /// Override the timeout for this call.
    #[must_use]
    pub fn timeout(mut self, timeout: core::time::Duration) -> Self {
        self.call.options.timeout = Some(timeout);
        self
    }

    /// Add a custom header.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.call.options.headers.insert(name, value);
        self
    }

    /// Attach the file part for an upload.
    #[must_use]
    pub fn file(mut self, part: FormPart) -> Self {
        self.call.file = Some(part);
        self
    }
}

impl<'a, T: Transport> IntoFuture for RequestBuilder<'a, T> {
    type Output = Result<Reply, Error>;

    type IntoFuture = Pin<Box<dyn Future<Output = Result<Reply, Error>> + Send + 'a>>;

    fn into_future(self) -> Self::IntoFuture {
        let Self { envelope, call } = self;
        Box::pin(async move { envelope.send(call).await })
    }
}

fn blank_header(headers: &HeaderMap, name: HeaderName) -> bool {
    headers
        .get(&name)
        .and_then(|value| value.to_str().ok())
        .is_none_or(is_blank)
}

fn assemble_form(file: Option<FormPart>, data: Option<Value>) -> FormData {
    let mut form = FormData::new();

    if let Some(part) = file {
        form.push(part.with_name(FILE_FIELD));
    }

    if let Some(Value::Object(fields)) = data {
        for (name, value) in fields {
            // Reserved for the file attachment.
            if name == FILE_FIELD {
                continue;
            }
            form.push(FormPart::text(name, text_value(&value)));
        }
    }

    form
}

fn unify(outcome: Result<Reply, TransportFailure>) -> Result<Reply, Error> {
    let Reply { body, response } = match outcome {
        Ok(reply) => reply,
        Err(failure) => {
            return Err(Error::Transport {
                source: failure.source,
                body: failure.body,
                response: failure.response,
            });
        }
    };

    let status = response.status;
    if (400..600).contains(&status.as_u16()) {
        if let Some(payload) = &body {
            if let Some(message) = remote_message(payload) {
                return Err(Error::Remote {
                    status,
                    message,
                    body,
                    response,
                });
            }
        }
    }

    Ok(Reply { body, response })
}

/// Extract the error message from an object-shaped error body. Non-object
/// bodies never classify as remote errors.
fn remote_message(body: &Value) -> Option<String> {
    let fields = body.as_object()?;

    match fields.get("error") {
        Some(Value::Null) | None => {}
        Some(Value::Object(error)) => {
            return Some(
                error
                    .get("message")
                    .map_or_else(|| Value::Object(error.clone()).to_string(), text_value),
            );
        }
        Some(error) => return Some(text_value(error)),
    }

    match fields.get("message") {
        Some(Value::String(message)) if !is_blank(message) => Some(message.clone()),
        _ => Some(body.to_string()),
    }
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
