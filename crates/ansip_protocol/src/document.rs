//! The SIP008 document.

use crate::error::{ProtocolError, ProtocolResult};
use crate::server::Server;
use serde::{Deserialize, Serialize};

/// The only SIP008 version this crate accepts.
pub const SIP008_VERSION: i64 = 1;

/// A SIP008 online configuration document.
///
/// `bytes_remaining` is only meaningful when a data cap is enforced, and by
/// convention is only present together with `bytes_used`. Neither counter is
/// emitted when absent, so a stored document reads back as it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sip008 {
    /// Protocol version tag. Must equal [`SIP008_VERSION`] to be stored.
    #[serde(rename = "Version", alias = "version", default)]
    pub version: i64,
    /// Server entries, in client order.
    #[serde(default)]
    pub servers: Vec<Server>,
    /// Data used by the user in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_used: Option<u64>,
    /// Data remaining for the user in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_remaining: Option<u64>,
}

impl Sip008 {
    /// Creates a document stamped with [`SIP008_VERSION`].
    pub fn new(servers: Vec<Server>, bytes_used: Option<u64>, bytes_remaining: Option<u64>) -> Self {
        Self {
            version: SIP008_VERSION,
            servers,
            bytes_used,
            bytes_remaining,
        }
    }

    /// Returns true if the version tag is [`SIP008_VERSION`].
    pub fn is_supported_version(&self) -> bool {
        self.version == SIP008_VERSION
    }

    /// Checks the version tag.
    pub fn validate(&self) -> ProtocolResult<()> {
        if self.is_supported_version() {
            Ok(())
        } else {
            Err(ProtocolError::UnsupportedVersion(self.version))
        }
    }

    /// Decodes the first JSON value in `bytes`.
    ///
    /// Anything after the first complete value is ignored. The version tag is
    /// not checked here; see [`Sip008::validate`].
    pub fn from_json(bytes: &[u8]) -> ProtocolResult<Self> {
        let mut values = serde_json::Deserializer::from_slice(bytes).into_iter::<Self>();
        match values.next() {
            Some(result) => result.map_err(ProtocolError::Decode),
            None => Err(ProtocolError::Empty),
        }
    }

    /// Encodes to JSON.
    pub fn to_json(&self) -> ProtocolResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(ProtocolError::Encode)
    }
}

impl Default for Sip008 {
    fn default() -> Self {
        Self::new(Vec::new(), None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const SAMPLE: &str = r#"{
        "Version": 1,
        "servers": [
            {
                "id": "27b8a625-4f4b-4428-9f0f-8a2317db7c79",
                "remarks": "Name of the server",
                "server": "example.com",
                "server_port": 8388,
                "password": "example",
                "method": "chacha20-ietf-poly1305",
                "plugin": "xxx",
                "plugin_opts": "xxxxx"
            },
            {
                "id": "7842c068-c667-41f2-8f7d-04feece3cb67",
                "remarks": "Name of the server",
                "server": "2001:db8::1",
                "server_port": 8388,
                "password": "example",
                "method": "chacha20-ietf-poly1305"
            }
        ],
        "bytes_used": 274877906944,
        "bytes_remaining": 824633720832
    }"#;

    #[test]
    fn decode_sample() {
        let doc = Sip008::from_json(SAMPLE.as_bytes()).unwrap();
        assert!(doc.is_supported_version());
        assert_eq!(doc.servers.len(), 2);
        assert_eq!(
            doc.servers[0].id,
            Uuid::parse_str("27b8a625-4f4b-4428-9f0f-8a2317db7c79").unwrap()
        );
        assert_eq!(doc.servers[0].plugin.as_deref(), Some("xxx"));
        assert_eq!(doc.servers[1].server, "2001:db8::1");
        assert_eq!(doc.servers[1].plugin, None);
        assert_eq!(doc.bytes_used, Some(274_877_906_944));
        assert_eq!(doc.bytes_remaining, Some(824_633_720_832));
    }

    #[test]
    fn reencoding_preserves_structure() {
        let doc = Sip008::from_json(SAMPLE.as_bytes()).unwrap();
        let encoded = doc.to_json().unwrap();
        let original: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
        let reencoded: serde_json::Value = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(original, reencoded);
    }

    #[test]
    fn lowercase_version_key_accepted() {
        let doc = Sip008::from_json(br#"{"version": 1, "servers": []}"#).unwrap();
        assert_eq!(doc.version, SIP008_VERSION);
    }

    #[test]
    fn missing_version_fails_validation() {
        let doc = Sip008::from_json(br#"{"servers": []}"#).unwrap();
        assert_eq!(doc.version, 0);
        assert!(matches!(
            doc.validate(),
            Err(ProtocolError::UnsupportedVersion(0))
        ));
    }

    #[test]
    fn wrong_version_fails_validation() {
        let doc = Sip008::from_json(br#"{"Version": 2}"#).unwrap();
        assert!(!doc.is_supported_version());
        assert!(doc.validate().is_err());
    }

    #[test]
    fn counters_omitted_when_absent() {
        let encoded = Sip008::default().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&encoded).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj["Version"], 1);
        assert!(!obj.contains_key("bytes_used"));
        assert!(!obj.contains_key("bytes_remaining"));
    }

    #[test]
    fn trailing_data_ignored() {
        let doc = Sip008::from_json(b"{\"Version\": 1}\n{garbage").unwrap();
        assert!(doc.servers.is_empty());
    }

    #[test]
    fn empty_input_rejected() {
        assert!(matches!(Sip008::from_json(b""), Err(ProtocolError::Empty)));
        assert!(matches!(Sip008::from_json(b"   "), Err(ProtocolError::Empty)));
    }

    #[test]
    fn malformed_input_rejected() {
        assert!(matches!(
            Sip008::from_json(b"{\"Version\": "),
            Err(ProtocolError::Decode(_))
        ));
        assert!(matches!(
            Sip008::from_json(b"{\"servers\": 5}"),
            Err(ProtocolError::Decode(_))
        ));
    }

    #[test]
    fn server_order_preserved() {
        let servers: Vec<Server> = (0..5u16)
            .map(|i| Server::new(format!("s{i}"), "example.com", 8000 + i, "pw", "aes-256-gcm"))
            .collect();
        let doc = Sip008::new(servers.clone(), Some(10), None);
        let decoded = Sip008::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(decoded.servers, servers);
        assert_eq!(decoded.bytes_used, Some(10));
        assert_eq!(decoded.bytes_remaining, None);
    }
}
