use serde::{Deserialize, Serialize};

/// Body of `POST /api/wake`.
#[derive(Debug, Deserialize)]
pub struct WakeRequest {
    /// Target hardware address, in any common notation
    /// ("AA:BB:CC:DD:EE:FF", "aa-bb-cc-dd-ee-ff", "AABBCCDDEEFF", ...).
    pub mac: String,
    /// Broadcast address to send to. Falls back to the server-wide default
    /// when absent or unparsable.
    pub broadcast: Option<String>,
    /// UDP port. 0 or absent selects the standard WoL port 9.
    #[serde(default)]
    pub port: u16,
}

/// Body of a successful `POST /api/wake` response.
#[derive(Debug, Serialize)]
pub struct WakeResponse {
    pub ok: bool,
    /// The MAC the packet was addressed to, canonicalized.
    pub mac: String,
}

#[cfg(test)]
mod tests {
    use crate::api::*;

    #[test]
    fn test_wake_request_optional_fields_default() {
        let req: WakeRequest = serde_json::from_str(r#"{"mac": "AA:BB:CC:DD:EE:FF"}"#).unwrap();
        assert_eq!(req.mac, "AA:BB:CC:DD:EE:FF");
        assert!(req.broadcast.is_none());
        assert_eq!(req.port, 0);
    }

    #[test]
    fn test_wake_request_full_body() {
        let req: WakeRequest = serde_json::from_str(
            r#"{"mac": "AABBCCDDEEFF", "broadcast": "192.168.1.255", "port": 7}"#,
        )
        .unwrap();
        assert_eq!(req.broadcast.as_deref(), Some("192.168.1.255"));
        assert_eq!(req.port, 7);
    }
}
