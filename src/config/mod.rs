//! Linker configuration.
//!
//! Defaults point at the production Nexus Mods endpoints. A config can be
//! loaded from TOML, adjusted from environment variables, or assembled with
//! [`LinkConfigBuilder`]. Validation collects every violation at once using
//! stillwater's `Validation` instead of stopping at the first.
//!
//! ```rust
//! use nexus_sso::config::LinkConfigBuilder;
//! use std::time::Duration;
//!
//! let config = LinkConfigBuilder::new()
//!     .timeout(Duration::from_secs(120))
//!     .build()
//!     .unwrap();
//! assert_eq!(config.timeout(), Duration::from_secs(120));
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use url::Url;

pub mod builder;
pub mod error;

pub use builder::LinkConfigBuilder;
pub use error::{ConfigError, ConfigViolation};

use crate::core::PROTOCOL_VERSION;

pub const DEFAULT_SOCKET_URL: &str = "wss://sso.nexusmods.com";
pub const DEFAULT_AUTHORIZE_URL: &str = "https://www.nexusmods.com/sso";
pub const DEFAULT_APPLICATION_SLUG: &str = "nnugget-helix";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// SSO WebSocket endpoint
    #[serde(default = "default_socket_url")]
    pub socket_url: String,

    /// Browser approval page; `id` and `application` are appended
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,

    /// Application slug registered with Nexus Mods
    #[serde(default = "default_application_slug")]
    pub application_slug: String,

    #[serde(default = "default_protocol")]
    pub protocol: u32,

    /// Absolute deadline for a whole attempt, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Upper bound on the closing handshake, in milliseconds
    #[serde(default = "default_close_timeout_ms")]
    pub close_timeout_ms: u64,
}

fn default_socket_url() -> String {
    DEFAULT_SOCKET_URL.to_string()
}
fn default_authorize_url() -> String {
    DEFAULT_AUTHORIZE_URL.to_string()
}
fn default_application_slug() -> String {
    DEFAULT_APPLICATION_SLUG.to_string()
}
fn default_protocol() -> u32 {
    PROTOCOL_VERSION
}
fn default_timeout_ms() -> u64 {
    5 * 60 * 1000
}
fn default_close_timeout_ms() -> u64 {
    5_000
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            socket_url: default_socket_url(),
            authorize_url: default_authorize_url(),
            application_slug: default_application_slug(),
            protocol: default_protocol(),
            timeout_ms: default_timeout_ms(),
            close_timeout_ms: default_close_timeout_ms(),
        }
    }
}

impl LinkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_millis(self.close_timeout_ms)
    }

    /// Parse and validate a TOML document. Missing keys take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.into_valid()
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Apply `NEXUS_SSO_*` environment overrides. Unparseable numbers are
    /// ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("NEXUS_SSO_SOCKET_URL") {
            self.socket_url = url;
        }
        if let Some(url) = lookup("NEXUS_SSO_AUTHORIZE_URL") {
            self.authorize_url = url;
        }
        if let Some(slug) = lookup("NEXUS_SSO_APPLICATION") {
            self.application_slug = slug;
        }
        if let Some(ms) = lookup("NEXUS_SSO_TIMEOUT_MS").and_then(|s| s.parse().ok()) {
            self.timeout_ms = ms;
        }
        if let Some(ms) = lookup("NEXUS_SSO_CLOSE_TIMEOUT_MS").and_then(|s| s.parse().ok()) {
            self.close_timeout_ms = ms;
        }
        self
    }

    /// Check every rule, accumulating ALL violations.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigViolation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<ConfigViolation>>> = Vec::new();

        checks.push(if has_scheme(&self.socket_url, &["ws", "wss"]) {
            Validation::success(())
        } else {
            Validation::fail(ConfigViolation::InvalidSocketUrl {
                url: self.socket_url.clone(),
            })
        });

        checks.push(if has_scheme(&self.authorize_url, &["http", "https"]) {
            Validation::success(())
        } else {
            Validation::fail(ConfigViolation::InvalidAuthorizeUrl {
                url: self.authorize_url.clone(),
            })
        });

        checks.push(if self.application_slug.trim().is_empty() {
            Validation::fail(ConfigViolation::EmptyApplicationSlug)
        } else {
            Validation::success(())
        });

        checks.push(if self.timeout_ms == 0 {
            Validation::fail(ConfigViolation::ZeroTimeout)
        } else {
            Validation::success(())
        });

        checks.push(if self.protocol == PROTOCOL_VERSION {
            Validation::success(())
        } else {
            Validation::fail(ConfigViolation::UnsupportedProtocol {
                found: self.protocol,
                expected: PROTOCOL_VERSION,
            })
        });

        Validation::all_vec(checks).map(|_| ())
    }

    /// Validate, turning accumulated violations into a [`ConfigError`].
    pub fn into_valid(self) -> Result<Self, ConfigError> {
        match self.validate() {
            Validation::Success(_) => Ok(self),
            Validation::Failure(errors) => Err(ConfigError::Invalid {
                violations: errors.iter().cloned().collect(),
            }),
        }
    }

    /// Browser URL for approving `request_id`.
    pub fn authorize_page(&self, request_id: &str) -> Result<Url, url::ParseError> {
        Url::parse_with_params(
            &self.authorize_url,
            &[
                ("id", request_id),
                ("application", self.application_slug.as_str()),
            ],
        )
    }
}

fn has_scheme(raw: &str, schemes: &[&str]) -> bool {
    Url::parse(raw)
        .map(|url| schemes.contains(&url.scheme()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = LinkConfig::default();
        assert!(config.validate().is_success());
        assert_eq!(config.timeout(), Duration::from_secs(300));
        assert_eq!(config.close_timeout(), Duration::from_secs(5));
        assert_eq!(config.protocol, 2);
    }

    #[test]
    fn validation_accumulates_all_violations() {
        let config = LinkConfig {
            socket_url: "https://sso.nexusmods.com".to_string(),
            authorize_url: "not a url".to_string(),
            application_slug: "  ".to_string(),
            protocol: 1,
            timeout_ms: 0,
            close_timeout_ms: 0,
        };

        match config.validate() {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 5);
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, ConfigViolation::InvalidSocketUrl { .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, ConfigViolation::InvalidAuthorizeUrl { .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, ConfigViolation::EmptyApplicationSlug)));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, ConfigViolation::ZeroTimeout)));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, ConfigViolation::UnsupportedProtocol { found: 1, .. })));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn into_valid_reports_every_violation() {
        let config = LinkConfig {
            application_slug: String::new(),
            timeout_ms: 0,
            ..LinkConfig::default()
        };

        match config.into_valid() {
            Err(ConfigError::Invalid { violations }) => {
                assert_eq!(
                    violations,
                    vec![ConfigViolation::EmptyApplicationSlug, ConfigViolation::ZeroTimeout]
                );
            }
            other => panic!("Expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let config = LinkConfig::from_toml_str(
            r#"
socket_url = "ws://localhost:9000"
timeout_ms = 1500
"#,
        )
        .unwrap();

        assert_eq!(config.socket_url, "ws://localhost:9000");
        assert_eq!(config.timeout(), Duration::from_millis(1500));
        assert_eq!(config.authorize_url, DEFAULT_AUTHORIZE_URL);
        assert_eq!(config.application_slug, DEFAULT_APPLICATION_SLUG);
    }

    #[test]
    fn toml_syntax_error_is_parse_error() {
        assert!(matches!(
            LinkConfig::from_toml_str("timeout_ms = ="),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sso.toml");
        std::fs::write(&path, "application_slug = \"my-tool\"\n").unwrap();

        let config = LinkConfig::load(&path).unwrap();
        assert_eq!(config.application_slug, "my-tool");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            LinkConfig::load(dir.path().join("absent.toml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn overrides_replace_only_given_keys() {
        let config = LinkConfig::default().with_overrides(|key| match key {
            "NEXUS_SSO_SOCKET_URL" => Some("ws://127.0.0.1:1".to_string()),
            "NEXUS_SSO_TIMEOUT_MS" => Some("250".to_string()),
            "NEXUS_SSO_CLOSE_TIMEOUT_MS" => Some("soon".to_string()),
            _ => None,
        });

        assert_eq!(config.socket_url, "ws://127.0.0.1:1");
        assert_eq!(config.timeout_ms, 250);
        assert_eq!(config.close_timeout_ms, default_close_timeout_ms());
        assert_eq!(config.authorize_url, DEFAULT_AUTHORIZE_URL);
    }

    #[test]
    fn authorize_page_encodes_request_id() {
        let config = LinkConfig::default();
        let url = config.authorize_page("a b&c").unwrap();

        assert_eq!(url.host_str(), Some("www.nexusmods.com"));
        assert_eq!(url.path(), "/sso");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("id".to_string(), "a b&c".to_string()),
                ("application".to_string(), DEFAULT_APPLICATION_SLUG.to_string()),
            ]
        );
        assert!(!url.as_str().contains("a b&c"));
    }
}
