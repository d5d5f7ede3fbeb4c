//! Server entries.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shadowsocks endpoint listed in a SIP008 document.
///
/// Missing fields decode to their empty value so partially filled entries
/// from lenient clients are still accepted. The plugin pair is omitted from
/// the JSON output when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    /// Identifies the entry across updates.
    pub id: Uuid,
    /// Human-readable name.
    pub remarks: String,
    /// Server address (hostname or IP literal).
    pub server: String,
    /// Server port.
    pub server_port: u16,
    /// Shadowsocks password.
    pub password: String,
    /// Cipher name, e.g. `chacha20-ietf-poly1305`.
    pub method: String,
    /// Plugin executable name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    /// Options passed to the plugin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_opts: Option<String>,
}

impl Server {
    /// Creates an entry with a freshly generated id and no plugin.
    pub fn new(
        remarks: impl Into<String>,
        server: impl Into<String>,
        server_port: u16,
        password: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            remarks: remarks.into(),
            server: server.into(),
            server_port,
            password: password.into(),
            method: method.into(),
            plugin: None,
            plugin_opts: None,
        }
    }

    /// Sets the plugin and its options.
    pub fn with_plugin(mut self, plugin: impl Into<String>, opts: impl Into<String>) -> Self {
        self.plugin = Some(plugin.into());
        self.plugin_opts = Some(opts.into());
        self
    }

    /// Overrides the generated id with a client-chosen one.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}
