//! Wire frames exchanged with the SSO socket.
//!
//! The server speaks snake_case JSON; these structs are the only place the
//! wire shape is known.

use serde::{Deserialize, Serialize};

/// Protocol revision announced in the registration frame.
pub const PROTOCOL_VERSION: u32 = 2;

/// Client-to-server frame that registers a request id.
///
/// `token` is serialized as `null` when absent; the server distinguishes a
/// fresh request from a resumed one by it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegistrationFrame<'a> {
    pub id: &'a str,
    pub token: Option<&'a str>,
    pub protocol: u32,
}

impl<'a> RegistrationFrame<'a> {
    pub fn new(id: &'a str, token: Option<&'a str>, protocol: u32) -> Self {
        Self {
            id,
            token: token.filter(|t| !t.trim().is_empty()),
            protocol,
        }
    }
}

/// Server-to-client frame.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct WireEnvelope {
    /// Missing counts as `false`.
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<EnvelopeData>,
}

/// Payload of a successful envelope. At most one field is set per frame.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct EnvelopeData {
    #[serde(default)]
    pub connection_token: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl WireEnvelope {
    pub fn parse(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// Server error text, with blank treated as absent.
    pub fn error_message(&self) -> Option<&str> {
        non_blank(self.error.as_deref())
    }
}

impl EnvelopeData {
    pub fn connection_token(&self) -> Option<&str> {
        non_blank(self.connection_token.as_deref())
    }

    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
