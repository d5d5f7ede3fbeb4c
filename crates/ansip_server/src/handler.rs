//! Request dispatch for the SIP008 endpoint.
//!
//! Every request goes to one endpoint regardless of path:
//!
//! | Method | Effect | Success |
//! |--------|--------|---------|
//! | POST   | store the body as the caller's document | 200, empty |
//! | GET    | return the caller's document | 200, JSON |
//! | DELETE | revoke the caller's credential and drop the document | 200, empty |
//!
//! Anything else is answered with 405 before credentials are looked at, so
//! an unsupported method never enrols a user.
//!
//! The credential and document stores are not updated together. A DELETE
//! removes the credential and then the document, and a GET that lands in
//! between re-enrols the caller and can still read the old document.

use crate::auth::CredentialStore;
use crate::credentials::Credentials;
use crate::error::{DispatchError, DispatchResult};
use crate::store::DocumentStore;
use ansip_protocol::Sip008;
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method, Request, Response, StatusCode};
use tracing::{debug, error, info, warn};

/// Dispatches SIP008 requests against the credential and document stores.
#[derive(Debug, Default)]
pub struct RequestHandler {
    credentials: CredentialStore,
    documents: DocumentStore,
}

impl RequestHandler {
    /// Creates a handler with empty stores.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a handler over existing stores.
    pub fn with_stores(credentials: CredentialStore, documents: DocumentStore) -> Self {
        Self {
            credentials,
            documents,
        }
    }

    /// Returns the credential store.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Returns the document store.
    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    /// Handles one request. Failures are turned into error responses.
    pub fn handle(&self, request: Request<Bytes>) -> Response<Bytes> {
        debug!(method = %request.method(), "request received");

        match self.dispatch(&request) {
            Ok(response) => response,
            Err(err) => {
                if err.is_server_error() {
                    error!(error = %err, "request failed");
                } else if matches!(err, DispatchError::UnsupportedMethod(_)) {
                    debug!(error = %err, "request rejected");
                } else {
                    warn!(error = %err, "request rejected");
                }
                respond(err.status(), err.body())
            }
        }
    }

    fn dispatch(&self, request: &Request<Bytes>) -> DispatchResult<Response<Bytes>> {
        let method = request.method();
        if !matches!(*method, Method::POST | Method::GET | Method::DELETE) {
            return Err(DispatchError::UnsupportedMethod(method.clone()));
        }

        let credentials = self.authenticate(request)?;

        match *method {
            Method::POST => self.store_document(&credentials, request.body()),
            Method::GET => self.load_document(&credentials),
            Method::DELETE => self.delete_user(&credentials),
            _ => Err(DispatchError::UnsupportedMethod(method.clone())),
        }
    }

    fn authenticate(&self, request: &Request<Bytes>) -> DispatchResult<Credentials> {
        let credentials = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
            .and_then(Credentials::from_header)
            .ok_or(DispatchError::MalformedCredentials)?;

        let verification = self
            .credentials
            .verify(credentials.username(), credentials.secret());
        if !verification.is_authenticated() {
            return Err(DispatchError::AuthenticationFailed(
                credentials.username().to_owned(),
            ));
        }
        if verification.is_new() {
            info!(username = credentials.username(), "enrolled new user");
        }

        Ok(credentials)
    }

    fn store_document(
        &self,
        credentials: &Credentials,
        body: &Bytes,
    ) -> DispatchResult<Response<Bytes>> {
        let document = Sip008::from_json(body)?;
        document.validate()?;

        debug!(
            username = credentials.username(),
            servers = document.servers.len(),
            "storing document"
        );
        self.documents.put(credentials.username(), document);
        Ok(respond(StatusCode::OK, Bytes::new()))
    }

    fn load_document(&self, credentials: &Credentials) -> DispatchResult<Response<Bytes>> {
        let document = self
            .documents
            .get(credentials.username())
            .ok_or_else(|| DispatchError::NotFound(credentials.username().to_owned()))?;
        let body = document
            .to_json()
            .map_err(DispatchError::SerializationFailed)?;

        let mut response = respond(StatusCode::OK, Bytes::from(body));
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(response)
    }

    fn delete_user(&self, credentials: &Credentials) -> DispatchResult<Response<Bytes>> {
        self.credentials
            .delete(credentials.username(), credentials.secret())?;
        self.documents.delete(credentials.username());

        info!(username = credentials.username(), "deleted user");
        Ok(respond(StatusCode::OK, Bytes::new()))
    }
}

fn respond(status: StatusCode, body: Bytes) -> Response<Bytes> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
}
