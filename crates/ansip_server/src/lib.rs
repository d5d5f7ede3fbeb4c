//! # ansip server
//!
//! An HTTP server that lets shadowsocks clients publish and fetch their own
//! [SIP008](https://shadowsocks.org/doc/sip008.html) document.
//!
//! This crate provides:
//! - A trust-on-first-use credential store ([`CredentialStore`])
//! - A per-user document store ([`DocumentStore`])
//! - `Authorization: Basic` parsing ([`Credentials`])
//! - The request dispatcher ([`RequestHandler`])
//! - A hyper-based serving loop with optional TLS ([`Sip008Server`])
//!
//! # Authentication
//!
//! Accounts are not provisioned. The first secret presented for a username
//! is recorded and required from then on, until the user deletes itself with
//! a `DELETE` request. Everything is kept in memory.
//!
//! # Protocol
//!
//! All requests go to a single endpoint; the path is ignored:
//! 1. `POST` stores the request body as the caller's document
//! 2. `GET` returns the stored document
//! 3. `DELETE` revokes the credential and discards the document

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod auth;
mod config;
mod credentials;
mod error;
mod handler;
mod server;
mod store;
mod tls;

pub use auth::{CredentialStore, Verification};
pub use config::{LogTarget, ServerConfig};
pub use credentials::{Credentials, BASIC_PREFIX};
pub use error::{
    CredentialError, CredentialResult, DispatchError, DispatchResult, ServerError, ServerResult,
};
pub use handler::RequestHandler;
pub use server::{Sip008Server, MAX_BODY_BYTES};
pub use store::DocumentStore;
pub use tls::load_acceptor;

pub use tokio_rustls::TlsAcceptor;
