//! Shared fixture transports for the integration suites.
//!
//! No real network is involved: each fixture implements [`Transport`]
//! in-process. `RecordingTransport` captures the descriptors the envelope
//! builds and answers with a scripted outcome, `BlackholeTransport` emulates
//! an endpoint that never responds within the descriptor's timeout, and
//! `AlbumTransport` hosts a small album API with normalizing validation
//! (id assignment, title-casing, year parsing, genre default).

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use envelope::{Descriptor, Reply, ResponseMeta, StatusCode, Transport, TransportFailure};
use serde_json::{Value, json};

type Responder = Box<dyn Fn(&Descriptor) -> Result<Reply, TransportFailure> + Send + Sync>;

/// Captures every dispatched descriptor and answers with a scripted outcome.
///
/// Clones share the capture log, so tests can hand one clone to the envelope
/// and inspect the other.
#[derive(Clone)]
pub struct RecordingTransport {
    inner: Arc<RecordingInner>,
}

struct RecordingInner {
    responder: Responder,
    seen: Mutex<Vec<Descriptor>>,
}

impl RecordingTransport {
    /// Build a transport around an arbitrary responder closure.
    pub fn with(
        responder: impl Fn(&Descriptor) -> Result<Reply, TransportFailure> + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(RecordingInner {
                responder: Box::new(responder),
                seen: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Always replies with the given status and body.
    pub fn replying(status: u16, body: Option<Value>) -> Self {
        let status = StatusCode::from_u16(status).expect("fixture status code");
        Self::with(move |_| Ok(Reply::new(body.clone(), ResponseMeta::new(status))))
    }

    /// Always replies `200` with a small JSON body.
    pub fn ok() -> Self {
        Self::replying(200, Some(json!({ "result": "ok" })))
    }

    /// Always fails with a connection-refused transport error.
    pub fn failing(message: &'static str) -> Self {
        Self::with(move |_| {
            Err(TransportFailure::new(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                message,
            )))
        })
    }

    /// Number of requests that reached the transport.
    pub fn dispatched(&self) -> usize {
        self.inner.seen.lock().unwrap().len()
    }

    /// Pop the most recently dispatched descriptor.
    pub fn take(&self) -> Descriptor {
        self.inner
            .seen
            .lock()
            .unwrap()
            .pop()
            .expect("a dispatched descriptor")
    }
}

impl Transport for RecordingTransport {
    async fn dispatch(&self, descriptor: Descriptor) -> Result<Reply, TransportFailure> {
        let outcome = (self.inner.responder)(&descriptor);
        self.inner.seen.lock().unwrap().push(descriptor);
        outcome
    }
}

/// An endpoint that never answers: sleeps through the descriptor's timeout,
/// then fails the way a real transport reports an expired request.
pub struct BlackholeTransport;

impl Transport for BlackholeTransport {
    async fn dispatch(&self, descriptor: Descriptor) -> Result<Reply, TransportFailure> {
        let limit = descriptor.timeout.unwrap_or(Duration::from_secs(5));
        async_std::task::sleep(limit).await;
        Err(TransportFailure::new(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("no response within {}ms", limit.as_millis()),
        )))
    }
}

/// Base URL the album fixture answers under.
pub const ALBUM_BASE: &str = "http://fixture.local";

/// In-process album API: a mutable store with normalizing validation on
/// writes.
#[derive(Default)]
pub struct AlbumTransport {
    store: Mutex<AlbumStore>,
}

#[derive(Default)]
struct AlbumStore {
    albums: Vec<Value>,
    next_id: i64,
}

impl AlbumTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn respond(&self, descriptor: &Descriptor) -> Reply {
        let target = descriptor.target();
        let path = target
            .strip_prefix(ALBUM_BASE)
            .unwrap_or(&target)
            .trim_matches('/')
            .to_string();

        let body = match &descriptor.body {
            Some(envelope::Payload::Json(value)) => Some(value.clone()),
            _ => None,
        };

        let mut store = self.store.lock().unwrap();
        match (descriptor.method.as_str(), path.as_str()) {
            ("GET", "albums") => ok(Some(Value::Array(store.albums.clone()))),
            ("POST", "albums") => match format_album(store.next_id, body.as_ref()) {
                Ok(album) => {
                    store.next_id += 1;
                    store.albums.push(album.clone());
                    ok(Some(album))
                }
                Err(message) => error_reply(400, &message),
            },
            (method, path) => {
                let Some(id) = path
                    .strip_prefix("albums/")
                    .and_then(|raw| raw.parse::<i64>().ok())
                else {
                    return error_reply(400, "Empty or invalid album id.");
                };
                let index = store
                    .albums
                    .iter()
                    .position(|album| album.get("id").and_then(Value::as_i64) == Some(id));
                match (method, index) {
                    ("HEAD", Some(_)) => ok(None),
                    ("HEAD", None) => Reply::new(None, meta(404)),
                    ("GET", Some(index)) => ok(Some(store.albums[index].clone())),
                    ("GET", None) => ok(None),
                    ("DELETE", Some(index)) => {
                        let removed = store.albums.remove(index);
                        ok(Some(removed))
                    }
                    ("DELETE", None) => error_reply(404, "Album not found."),
                    _ => error_reply(404, &format!("no route for {method} {path}")),
                }
            }
        }
    }
}

impl Transport for AlbumTransport {
    async fn dispatch(&self, descriptor: Descriptor) -> Result<Reply, TransportFailure> {
        Ok(self.respond(&descriptor))
    }
}

fn meta(status: u16) -> ResponseMeta {
    ResponseMeta::new(StatusCode::from_u16(status).expect("fixture status code"))
}

fn ok(body: Option<Value>) -> Reply {
    Reply::new(body, meta(200))
}

fn error_reply(status: u16, message: &str) -> Reply {
    Reply::new(Some(json!({ "message": message })), meta(status))
}

/// Normalize an incoming album: trimmed artist, title-cased album and genre,
/// parsed positive year, counter id.
fn format_album(id: i64, body: Option<&Value>) -> Result<Value, String> {
    let fields = body
        .and_then(Value::as_object)
        .ok_or_else(|| "Missing or invalid album data.".to_string())?;

    let artist = fields
        .get("artist")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|artist| !artist.is_empty())
        .ok_or_else(|| "Missing or invalid artist.".to_string())?;

    let album = fields
        .get("album")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|album| !album.is_empty())
        .map(title_case)
        .ok_or_else(|| "Missing or invalid album.".to_string())?;

    let year = match fields.get("year") {
        Some(Value::Number(number)) => number.as_i64(),
        Some(Value::String(raw)) => raw.trim().parse().ok(),
        _ => None,
    }
    .filter(|year| *year > 0)
    .ok_or_else(|| "Missing or invalid year.".to_string())?;

    let genre = fields
        .get("genre")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|genre| !genre.is_empty())
        .map_or_else(|| "Unknown".to_string(), title_case);

    Ok(json!({
        "id": id,
        "artist": artist,
        "album": album,
        "year": year,
        "genre": genre,
    }))
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
