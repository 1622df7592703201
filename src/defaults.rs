//! Default configuration applied to outgoing requests.
//!
//! A [`Defaults`] value holds the base URL, authorization value and timeout
//! that fill in whatever a call does not override. It is owned by the
//! [`Envelope`](crate::Envelope) rather than living in process-wide state, so
//! ownership and lifetime are explicit. Requests snapshot the current values
//! while building their descriptor; mutating the defaults afterwards never
//! affects a request already in flight.

use core::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Base URL, authorization and timeout defaults for an envelope.
///
/// Setters reject invalid input by leaving the previous value in place:
/// blank strings for the base URL and authorization, zero durations for the
/// timeout. The timeout starts out at 30 seconds; the other fields start out
/// absent.
#[derive(Debug, Clone)]
pub struct Defaults {
    base_url: Option<String>,
    authorization: Option<String>,
    timeout: Option<Duration>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            base_url: None,
            authorization: None,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl Defaults {
    /// Create a defaults value with no base URL, no authorization and the
    /// initial 30 second timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a base URL is currently configured.
    #[must_use]
    pub const fn has_base_url(&self) -> bool {
        self.base_url.is_some()
    }

    /// The configured base URL, if any.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Set the base URL prefixed to relative request paths.
    ///
    /// Blank input is ignored and the previous value retained.
    pub fn set_base_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        if is_blank(&url) {
            return;
        }
        self.base_url = Some(url);
    }

    /// Remove the configured base URL.
    pub fn clear_base_url(&mut self) {
        self.base_url = None;
    }

    /// Whether an authorization value is currently configured.
    #[must_use]
    pub const fn has_authorization(&self) -> bool {
        self.authorization.is_some()
    }

    /// The configured authorization value, if any.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    /// Set the authorization value sent as the `Authorization` header when a
    /// call does not carry one of its own.
    ///
    /// Blank input is ignored and the previous value retained.
    pub fn set_authorization_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        if is_blank(&token) {
            return;
        }
        self.authorization = Some(token);
    }

    /// Set the authorization value from basic credentials, stored as
    /// `Basic base64(user:password)`.
    ///
    /// If either credential is blank the call is ignored and the previous
    /// value retained.
    pub fn set_basic_authorization(&mut self, user: impl AsRef<str>, password: impl AsRef<str>) {
        let (user, password) = (user.as_ref(), password.as_ref());
        if is_blank(user) || is_blank(password) {
            return;
        }
        let encoded = BASE64.encode(format!("{user}:{password}"));
        self.authorization = Some(format!("Basic {encoded}"));
    }

    /// Remove the configured authorization value.
    pub fn clear_authorization(&mut self) {
        self.authorization = None;
    }

    /// Whether a timeout is currently configured.
    #[must_use]
    pub const fn has_timeout(&self) -> bool {
        self.timeout.is_some()
    }

    /// The configured timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Set the timeout applied to requests that do not override it.
    ///
    /// A zero duration is ignored and the previous value retained.
    pub fn set_timeout(&mut self, timeout: Duration) {
        if timeout.is_zero() {
            return;
        }
        self.timeout = Some(timeout);
    }

    /// Millisecond convenience form of [`set_timeout`](Self::set_timeout).
    pub fn set_timeout_ms(&mut self, millis: u64) {
        self.set_timeout(Duration::from_millis(millis));
    }

    /// Remove the configured timeout. Requests without a per-call timeout
    /// then carry none and the transport applies its own default.
    pub fn clear_timeout(&mut self) {
        self.timeout = None;
    }
}
