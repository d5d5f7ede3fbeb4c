//! Server configuration.
//!
//! Read once at startup from a JSON file:
//!
//! ```json
//! {
//!   "listen": "0.0.0.0:8443",
//!   "log": "stderr",
//!   "cert": "/etc/ansip/cert.pem",
//!   "key": "/etc/ansip/key.pem",
//!   "server_name": "sip008.example.com"
//! }
//! ```

use crate::error::{ServerError, ServerResult};
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
    /// Logging disabled.
    Discard,
    /// Appended to a file.
    File(PathBuf),
}

/// Configuration for the SIP008 server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default)]
    pub listen: String,
    /// Log destination: `stdout`, `stderr`, `null`/`none`/`ignore`, or a file path.
    #[serde(default)]
    pub log: String,
    /// PEM certificate chain. Enables TLS when set.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub cert: Option<PathBuf>,
    /// PEM private key for `cert`.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub key: Option<PathBuf>,
    /// Expected SNI name.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub server_name: Option<String>,
}

impl ServerConfig {
    /// Creates a plain-HTTP configuration logging to stdout.
    pub fn new(listen: impl Into<String>) -> Self {
        Self {
            listen: listen.into(),
            log: String::new(),
            cert: None,
            key: None,
            server_name: None,
        }
    }

    /// Loads and validates a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> ServerResult<Self> {
        let file = File::open(path.as_ref())?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a configuration from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> ServerResult<Self> {
        let config: Self = serde_json::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// Enables TLS with the given certificate chain and key.
    pub fn with_tls(mut self, cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        self.cert = Some(cert.into());
        self.key = Some(key.into());
        self
    }

    /// Sets the expected SNI name.
    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    /// Sets the log destination.
    pub fn with_log(mut self, log: impl Into<String>) -> Self {
        self.log = log.into();
        self
    }

    /// Returns true if a certificate is configured.
    pub fn tls_enabled(&self) -> bool {
        self.cert.is_some()
    }

    /// Resolves the `log` field.
    pub fn log_target(&self) -> LogTarget {
        match self.log.as_str() {
            "" | "stdout" => LogTarget::Stdout,
            "stderr" => LogTarget::Stderr,
            "null" | "none" | "ignore" => LogTarget::Discard,
            path => LogTarget::File(PathBuf::from(path)),
        }
    }

    /// Checks that the settings are usable together.
    pub fn validate(&self) -> ServerResult<()> {
        if self.listen.trim().is_empty() {
            return Err(ServerError::InvalidConfig("listen address is empty".into()));
        }
        if self.cert.is_some() != self.key.is_some() {
            return Err(ServerError::InvalidConfig(
                "cert and key must be set together".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("127.0.0.1:8080")
    }
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()).map(T::from))
}
