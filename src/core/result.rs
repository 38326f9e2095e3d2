//! Terminal outcome of a linking attempt.

use serde::Serialize;
use std::fmt;

/// Outcome returned by every linking attempt.
///
/// The set is closed: an attempt ends in exactly one of these and nothing
/// else escapes the linker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LinkResult {
    /// The server issued an API key.
    Success { api_key: String },

    /// The attempt failed: transport error, server error, or bad payload.
    Failure { message: String },

    /// The deadline passed or the caller cancelled.
    Cancelled { message: String },
}

impl LinkResult {
    pub fn success(api_key: impl Into<String>) -> Self {
        Self::Success {
            api_key: api_key.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// The issued key, if the attempt succeeded.
    pub fn api_key(&self) -> Option<&str> {
        match self {
            Self::Success { api_key } => Some(api_key),
            _ => None,
        }
    }

    /// The failure or cancellation text, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message } | Self::Cancelled { message } => Some(message),
        }
    }
}

// Display never includes the key itself.
impl fmt::Display for LinkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { .. } => f.write_str("linked"),
            Self::Failure { message } => write!(f, "failed: {message}"),
            Self::Cancelled { message } => write!(f, "cancelled: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_follow_variant() {
        let ok = LinkResult::success("key-xyz");
        assert!(ok.is_success());
        assert_eq!(ok.api_key(), Some("key-xyz"));
        assert_eq!(ok.message(), None);

        let failed = LinkResult::failure("expired");
        assert!(!failed.is_success());
        assert!(!failed.is_cancelled());
        assert_eq!(failed.api_key(), None);
        assert_eq!(failed.message(), Some("expired"));

        let cancelled = LinkResult::cancelled("timed out");
        assert!(cancelled.is_cancelled());
        assert_eq!(cancelled.message(), Some("timed out"));
    }

    #[test]
    fn display_hides_api_key() {
        let shown = LinkResult::success("secret-key").to_string();
        assert_eq!(shown, "linked");
        assert!(!shown.contains("secret"));
    }

    #[test]
    fn serializes_with_outcome_tag() {
        let json = serde_json::to_value(LinkResult::failure("expired")).unwrap();
        assert_eq!(json["outcome"], "failure");
        assert_eq!(json["message"], "expired");
    }
}
