//! Error types for the SIP008 server.

use ansip_protocol::ProtocolError;
use bytes::Bytes;
use http::{Method, StatusCode};
use thiserror::Error;

/// Result type for server setup and I/O.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors raised while configuring or running the server.
///
/// All of these are startup or transport errors; per-request failures are
/// [`DispatchError`]s and never leave the request handler.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The configuration is inconsistent.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The configuration file is not valid JSON.
    #[error("decode config: {0}")]
    ConfigDecode(#[from] serde_json::Error),

    /// Certificate or key could not be loaded.
    #[error("tls error: {0}")]
    Tls(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for credential store operations.
pub type CredentialResult<T> = Result<T, CredentialError>;

/// Errors from [`CredentialStore::delete`](crate::CredentialStore::delete).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The username has no recorded secret.
    #[error("user not found: {0}")]
    NotFound(String),

    /// The presented secret does not match the recorded one.
    #[error("invalid secret for user: {0}")]
    Unauthorized(String),
}

/// Result type for request dispatch.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Ways a single request can fail.
///
/// Each variant maps to exactly one HTTP status via [`DispatchError::status`].
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The Authorization header is missing or unparseable.
    #[error("missing or malformed credentials")]
    MalformedCredentials,

    /// The secret does not match the one recorded for a known user.
    #[error("authentication failed for user: {0}")]
    AuthenticationFailed(String),

    /// The body is not a SIP008 document, or has the wrong version.
    #[error("malformed document: {0}")]
    MalformedDocument(#[from] ProtocolError),

    /// No document is stored for the user.
    #[error("no document for user: {0}")]
    NotFound(String),

    /// The stored document could not be encoded.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[source] ProtocolError),

    /// The request method is not POST, GET or DELETE.
    #[error("method not allowed: {0}")]
    UnsupportedMethod(Method),

    /// Deleting the credential failed (unknown user or wrong secret).
    #[error("credential deletion denied: {0}")]
    CredentialDeletionDenied(#[from] CredentialError),
}

impl DispatchError {
    /// Returns the response status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::MalformedCredentials => StatusCode::UNAUTHORIZED,
            DispatchError::AuthenticationFailed(_) => StatusCode::FORBIDDEN,
            DispatchError::MalformedDocument(_) => StatusCode::BAD_REQUEST,
            DispatchError::NotFound(_) => StatusCode::NOT_FOUND,
            DispatchError::SerializationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DispatchError::UnsupportedMethod(_) => StatusCode::METHOD_NOT_ALLOWED,
            DispatchError::CredentialDeletionDenied(_) => StatusCode::UNAUTHORIZED,
        }
    }

    /// Returns the response body for this error.
    ///
    /// Only a version mismatch carries an explanation; every other failure is
    /// reported by status alone.
    pub fn body(&self) -> Bytes {
        match self {
            DispatchError::MalformedDocument(ProtocolError::UnsupportedVersion(_)) => {
                Bytes::from_static(b"invalid version")
            }
            _ => Bytes::new(),
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}
