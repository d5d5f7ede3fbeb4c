//! Credential extraction from the `Authorization` header.
//!
//! The header must use the `Basic ` prefix. The payload is normally
//! `base64(username:secret)`, but a payload that does not decode is used
//! verbatim, so `Basic user:pass` is accepted as well. This is looser than
//! RFC 7617 and clients rely on it.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use std::fmt;

/// Scheme prefix required at the start of the header value.
pub const BASIC_PREFIX: &str = "Basic ";

/// Standard alphabet with canonical padding. Non-zero bits after the last
/// full byte are ignored rather than rejected.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// A username and secret taken from a request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    secret: String,
}

impl Credentials {
    /// Creates credentials from their parts.
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    /// Parses an `Authorization` header value.
    ///
    /// Returns `None` if the prefix is missing, the payload is empty, or the
    /// payload has no `:`. Either side of the `:` may be empty.
    pub fn from_header(value: &str) -> Option<Self> {
        let payload = value.strip_prefix(BASIC_PREFIX)?;
        if payload.is_empty() {
            return None;
        }

        let decoded = PAYLOAD_ENGINE
            .decode(payload)
            .ok()
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| String::from_utf8(raw).ok());
        let text = decoded.as_deref().unwrap_or(payload);

        let (username, secret) = text.split_once(':')?;
        Some(Self::new(username, secret))
    }

    /// Returns the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the secret.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Splits into `(username, secret)`.
    pub fn into_parts(self) -> (String, String) {
        (self.username, self.secret)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}
