//! Builder API for creating a validated [`LinkConfig`].

use crate::config::{ConfigError, LinkConfig};
use std::time::Duration;

/// Builder for creating linker configuration
#[derive(Debug, Clone, Default)]
pub struct LinkConfigBuilder {
    config: LinkConfig,
}

impl LinkConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing config, e.g. one loaded from disk
    pub fn from_config(config: LinkConfig) -> Self {
        Self { config }
    }

    pub fn socket_url(mut self, url: impl Into<String>) -> Self {
        self.config.socket_url = url.into();
        self
    }

    pub fn authorize_url(mut self, url: impl Into<String>) -> Self {
        self.config.authorize_url = url.into();
        self
    }

    pub fn application_slug(mut self, slug: impl Into<String>) -> Self {
        self.config.application_slug = slug.into();
        self
    }

    /// Set the deadline for a whole attempt
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.config.timeout_ms = duration_ms(duration);
        self
    }

    /// Set the bound on the closing handshake
    pub fn close_timeout(mut self, duration: Duration) -> Self {
        self.config.close_timeout_ms = duration_ms(duration);
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<LinkConfig, ConfigError> {
        self.config.into_valid()
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
