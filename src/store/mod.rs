//! Persisted SSO credentials and the stores that save them.
//!
//! The linker mutates a caller-owned [`Credentials`] value and hands it to a
//! [`CredentialStore`] after every change, so a crash mid-handshake can
//! resume with the same request id and connection token.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub mod error;

pub use error::StoreError;

/// Version identifier for the credential file format
pub const STORE_VERSION: u32 = 1;

/// SSO state kept in the caller's settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Correlates the socket session with the browser approval page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Continuation token issued mid-handshake.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_token: Option<String>,

    /// Long-lived API key issued on approval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// When the key was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_at: Option<DateTime<Utc>>,
}

/// Borrowed view of an in-flight request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkRequest<'a> {
    pub request_id: &'a str,
    pub connection_token: Option<&'a str>,
}

/// Whether an account is currently linked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkStatus {
    NotLinked,
    Linked { linked_at: Option<DateTime<Utc>> },
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLinked => f.write_str("Not linked"),
            Self::Linked { linked_at: None } => f.write_str("Linked"),
            Self::Linked {
                linked_at: Some(at),
            } => write!(
                f,
                "Linked ({})",
                at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            ),
        }
    }
}

impl Credentials {
    pub fn request_id(&self) -> Option<&str> {
        non_blank(self.request_id.as_deref())
    }

    pub fn connection_token(&self) -> Option<&str> {
        non_blank(self.connection_token.as_deref())
    }

    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }

    /// The pending request, if a request id has been issued.
    pub fn link_request(&self) -> Option<LinkRequest<'_>> {
        self.request_id().map(|request_id| LinkRequest {
            request_id,
            connection_token: self.connection_token(),
        })
    }

    pub fn status(&self) -> LinkStatus {
        match self.api_key() {
            Some(_) => LinkStatus::Linked {
                linked_at: self.linked_at,
            },
            None => LinkStatus::NotLinked,
        }
    }

    /// Record a freshly issued key and drop the request that produced it.
    pub fn complete(&mut self, api_key: &str, linked_at: DateTime<Utc>) {
        self.api_key = Some(api_key.to_string());
        self.linked_at = Some(linked_at);
        self.clear_link_request();
    }

    pub fn clear_link_request(&mut self) {
        self.request_id = None;
        self.connection_token = None;
    }

    /// Forget the key and any request in flight.
    pub fn unlink(&mut self) {
        self.api_key = None;
        self.linked_at = None;
        self.clear_link_request();
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Persistence port for [`Credentials`].
///
/// `save` is called synchronously and must be complete on return.
pub trait CredentialStore: Send + Sync {
    fn save(&self, credentials: &Credentials) -> Result<(), StoreError>;
}

/// Keeps every saved snapshot in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Vec<Credentials>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All snapshots in save order.
    pub fn snapshots(&self) -> Vec<Credentials> {
        self.saved
            .lock()
            .map(|saved| saved.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Credentials> {
        self.snapshots().pop()
    }

    pub fn save_count(&self) -> usize {
        self.saved.lock().map(|saved| saved.len()).unwrap_or(0)
    }
}

impl CredentialStore for MemoryStore {
    fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        let mut saved = self
            .saved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        saved.push(credentials.clone());
        Ok(())
    }
}

/// Versioned on-disk document.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredentials {
    /// File format version
    pub version: u32,

    /// When the document was written
    pub saved_at: DateTime<Utc>,

    pub credentials: Credentials,
}

/// Stores credentials as a JSON document on disk.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load credentials, or defaults if the file does not exist yet.
    pub fn load(&self) -> Result<Credentials, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Credentials::default())
            }
            Err(e) => return Err(e.into()),
        };

        let stored: StoredCredentials = serde_json::from_str(&content)
            .map_err(|e| StoreError::Deserialization(e.to_string()))?;

        if stored.version != STORE_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: stored.version,
                supported: STORE_VERSION,
            });
        }

        Ok(stored.credentials)
    }
}

impl CredentialStore for JsonFileStore {
    fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        let stored = StoredCredentials {
            version: STORE_VERSION,
            saved_at: Utc::now(),
            credentials: credentials.clone(),
        };
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Write-then-rename so a crash never leaves a truncated file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
