//! Multipart form payloads for upload requests.
//!
//! The envelope only decides which fields end up in the form: the file
//! argument under the reserved [`FILE_FIELD`] name and the remaining data
//! keys as text fields. Wire encoding is the transport's job; [`FormData::encode`]
//! produces the `(boundary, body)` pair a transport needs, with the boundary
//! computed at encode time so the descriptor's cleared `Content-Type` can be
//! filled in correctly.

use std::{
    borrow::Cow,
    time::{SystemTime, UNIX_EPOCH},
};

/// Reserved field name for the file attachment of an upload.
pub const FILE_FIELD: &str = "file";

/// A single multipart/form-data field.
#[derive(Debug, Clone)]
pub struct FormPart {
    name: Cow<'static, str>,
    filename: Option<Cow<'static, str>>,
    content_type: Option<Cow<'static, str>>,
    data: Vec<u8>,
}

impl FormPart {
    /// Create a field with raw bytes.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            content_type: None,
            data: data.into(),
        }
    }

    /// Create a text field using UTF-8 content.
    #[must_use]
    pub fn text(name: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        Self::new(name, value.into().into_bytes())
    }

    /// Create a file field with filename and content type metadata, named
    /// after the reserved [`FILE_FIELD`].
    #[must_use]
    pub fn file(
        filename: impl Into<Cow<'static, str>>,
        content_type: impl Into<Cow<'static, str>>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: Cow::Borrowed(FILE_FIELD),
            filename: Some(filename.into()),
            content_type: Some(content_type.into()),
            data,
        }
    }

    /// Rename the field.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Attach/override the filename metadata.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<Cow<'static, str>>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Attach/override the content type metadata.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<Cow<'static, str>>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// The field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The filename metadata, if set.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// The content type metadata, if set.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The field content.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// An assembled multipart form payload.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    boundary: Option<String>,
    parts: Vec<FormPart>,
}

impl FormData {
    /// Create an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the boundary string (otherwise auto-generated at encode time).
    #[must_use]
    pub fn boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = Some(boundary.into());
        self
    }

    /// Add a part to the payload (builder-style).
    #[must_use]
    pub fn with_part(mut self, part: FormPart) -> Self {
        self.parts.push(part);
        self
    }

    /// Push a part into the payload.
    pub fn push(&mut self, part: FormPart) {
        self.parts.push(part);
    }

    /// The assembled fields, in insertion order.
    #[must_use]
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Whether the form holds a field with the given name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|part| part.name() == name)
    }

    /// Encode the payload into `(boundary, body_bytes)` for the wire.
    #[must_use]
    pub fn encode(&self) -> (String, Vec<u8>) {
        let boundary = self.boundary.clone().unwrap_or_else(generated_boundary);
        let mut body = Vec::new();

        for part in &self.parts {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"{}\r\n",
                    part.name(),
                    part.filename()
                        .map(|name| format!("; filename=\"{name}\""))
                        .unwrap_or_default()
                )
                .as_bytes(),
            );
            if let Some(content_type) = part.content_type() {
                body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
            }
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(part.data());
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        (boundary, body)
    }
}

fn generated_boundary() -> String {
    format!("envelope-{:#x}", monotonic_suffix())
}

fn monotonic_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or_else(|_| 0, |duration| duration.as_micros())
}
