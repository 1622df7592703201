//! # HTTP request envelope
//! Envelope is a thin client-side layer over a pluggable HTTP transport.
//! It takes care of the boilerplate around every call:
//! - Method normalization and validation
//! - Injectable defaults for base URL, authorization and timeout
//! - Header and authorization precedence rules
//! - Body/query disambiguation for body-less methods
//! - Multipart upload assembly
//! - One unified outcome for transport failures, remote errors and success
//!
//! # Quick start
//! ```rust,no_run
//! # async fn example(transport: impl envelope::Transport) -> envelope::Result<()> {
//! use envelope::Envelope;
//! use serde_json::json;
//!
//! let mut envelope = Envelope::new(transport);
//! envelope.defaults_mut().set_base_url("https://api.example.com");
//! envelope.defaults_mut().set_authorization_token("Bearer sesame");
//!
//! let reply = envelope.get("albums/3").await?;
//! println!("{:?}", reply.body);
//!
//! let created = envelope
//!     .post("albums")
//!     .data(json!({ "artist": "Flamingosis", "album": "A Groovy Thing" }))
//!     .await?;
//! println!("{:?}", created.body);
//! # Ok(())
//! # }
//! ```

pub mod defaults;
pub mod descriptor;
pub mod envelope;
pub mod error;
pub mod form;
pub mod transport;

pub use http::{self, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};

pub use defaults::Defaults;
pub use descriptor::{Descriptor, Options, Payload};
pub use envelope::{Envelope, RequestBuilder};
pub use error::{Error, ErrorCode, ErrorKind};
pub use form::{FILE_FIELD, FormData, FormPart};
pub use transport::{Reply, ResponseMeta, Transport, TransportFailure};

/// Result alias for envelope operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;
