//! TLS termination.
//!
//! Only TLS 1.3 is offered. The certificate chain and key are read from disk
//! on every handshake, so a renewed certificate is served as soon as the files
//! are replaced. They are also loaded once by [`load_acceptor`] so that a bad
//! pair is reported at startup instead of on the first connection.

use crate::error::{ServerError, ServerResult};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::{ClientHello, ResolvesServerCert};
use rustls::sign::CertifiedKey;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, warn};

/// Builds a TLS 1.3 acceptor that reloads `cert` and `key` per handshake.
pub fn load_acceptor(
    cert: impl Into<PathBuf>,
    key: impl Into<PathBuf>,
    server_name: Option<String>,
) -> ServerResult<TlsAcceptor> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let resolver = ReloadingCertResolver {
        cert_path: cert.into(),
        key_path: key.into(),
        server_name,
        provider: Arc::clone(&provider),
    };
    resolver.load()?;

    let config = rustls::ServerConfig::builder_with_provider(provider)
        .with_protocol_versions(&[&rustls::version::TLS13])
        .map_err(|e| ServerError::Tls(e.to_string()))?
        .with_no_client_auth()
        .with_cert_resolver(Arc::new(resolver));

    Ok(TlsAcceptor::from(Arc::new(config)))
}

#[derive(Debug)]
struct ReloadingCertResolver {
    cert_path: PathBuf,
    key_path: PathBuf,
    server_name: Option<String>,
    provider: Arc<CryptoProvider>,
}

impl ReloadingCertResolver {
    fn load(&self) -> ServerResult<CertifiedKey> {
        let certs = load_certs(&self.cert_path)?;
        let key = load_private_key(&self.key_path)?;
        let signing_key = self
            .provider
            .key_provider
            .load_private_key(key)
            .map_err(|e| ServerError::Tls(format!("{}: {e}", self.key_path.display())))?;
        Ok(CertifiedKey::new(certs, signing_key))
    }
}

impl ResolvesServerCert for ReloadingCertResolver {
    fn resolve(&self, client_hello: ClientHello<'_>) -> Option<Arc<CertifiedKey>> {
        if let (Some(expected), Some(requested)) =
            (self.server_name.as_deref(), client_hello.server_name())
        {
            if !expected.eq_ignore_ascii_case(requested) {
                debug!(expected, requested, "sni does not match server_name");
            }
        }

        match self.load() {
            Ok(key) => Some(Arc::new(key)),
            Err(e) => {
                warn!(error = %e, "failed to reload certificate");
                None
            }
        }
    }
}

fn load_certs(path: &Path) -> ServerResult<Vec<CertificateDer<'static>>> {
    let mut reader = BufReader::new(File::open(path)?);
    let certs = rustls_pemfile::certs(&mut reader).collect::<Result<Vec<_>, _>>()?;
    if certs.is_empty() {
        return Err(ServerError::Tls(format!(
            "no certificates in {}",
            path.display()
        )));
    }
    Ok(certs)
}

fn load_private_key(path: &Path) -> ServerResult<PrivateKeyDer<'static>> {
    let mut reader = BufReader::new(File::open(path)?);
    rustls_pemfile::private_key(&mut reader)?
        .ok_or_else(|| ServerError::Tls(format!("no private key in {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn pem_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_cert_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_acceptor(dir.path().join("cert.pem"), dir.path().join("key.pem"), None);
        assert!(matches!(result, Err(ServerError::Io(_))));
    }

    #[test]
    fn cert_file_without_certificates() {
        let cert = pem_file("not a pem file\n");
        let key = pem_file("");
        let result = load_acceptor(cert.path(), key.path(), None);
        assert!(matches!(result, Err(ServerError::Tls(msg)) if msg.contains("no certificates")));
    }

    #[test]
    fn key_file_without_key() {
        // Structurally valid PEM block; the contents are never parsed as X.509 here.
        let cert = pem_file("-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n");
        let key = pem_file("nothing here\n");
        let result = load_acceptor(cert.path(), key.path(), None);
        assert!(matches!(result, Err(ServerError::Tls(msg)) if msg.contains("no private key")));
    }
}
