//! Configuration errors.

use thiserror::Error;

/// A single problem found while validating a [`LinkConfig`](super::LinkConfig).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigViolation {
    #[error("socket_url '{url}' must be a ws:// or wss:// URL")]
    InvalidSocketUrl { url: String },

    #[error("authorize_url '{url}' must be an http:// or https:// URL")]
    InvalidAuthorizeUrl { url: String },

    #[error("application_slug must not be empty")]
    EmptyApplicationSlug,

    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    #[error("protocol {found} is not supported (expected {expected})")]
    UnsupportedProtocol { found: u32, expected: u32 },
}

/// Errors that can occur while building or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid SSO configuration: {}", summarize(.violations))]
    Invalid { violations: Vec<ConfigViolation> },

    #[error("failed to read SSO configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse SSO configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

fn summarize(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
