//! # ansip protocol
//!
//! Types for the [SIP008](https://shadowsocks.org/doc/sip008.html) online
//! configuration delivery format.
//!
//! This crate provides:
//! - [`Sip008`], the per-user document (server list plus usage counters)
//! - [`Server`], a single shadowsocks endpoint description
//! - JSON encoding/decoding with version checking
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod document;
mod error;
mod server;

pub use document::{Sip008, SIP008_VERSION};
pub use error::{ProtocolError, ProtocolResult};
pub use server::Server;
pub use uuid::Uuid;
