//! Maps one server payload to the linker's next move.

use crate::core::envelope::WireEnvelope;
use crate::core::LinkResult;
use crate::ports::{report, ProgressSink};
use crate::store::{CredentialStore, Credentials};
use chrono::Utc;
use tracing::{debug, warn};

pub const UNKNOWN_SERVER_ERROR: &str = "Nexus Mods returned an unknown error.";
pub const MISSING_API_KEY: &str = "SSO completed without providing an API key.";
pub const TOKEN_CONFIRMED: &str =
    "Connection confirmed. Please approve the request in your browser.";
pub const API_KEY_RECEIVED: &str = "API key received.";

/// What the linker does after a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Keep receiving.
    Continue,
    /// Stop with this result.
    Terminal(LinkResult),
}

/// Interpret one payload, persisting any state it carries.
///
/// Saves happen before the matching progress line is reported. A payload
/// that fails to parse ends the attempt without touching `credentials`.
/// A connection token is never required before the key: a resumed request
/// may receive the key first.
pub fn interpret(
    payload: &str,
    credentials: &mut Credentials,
    store: &dyn CredentialStore,
    progress: Option<&dyn ProgressSink>,
) -> Verdict {
    let envelope = match WireEnvelope::parse(payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Discarding malformed SSO message");
            return Verdict::Terminal(LinkResult::failure(format!(
                "Malformed SSO message: {e}"
            )));
        }
    };

    if !envelope.success {
        let message = envelope.error_message().unwrap_or(UNKNOWN_SERVER_ERROR);
        debug!(error = message, "SSO server rejected the request");
        return Verdict::Terminal(LinkResult::failure(message));
    }

    let Some(data) = envelope.data else {
        debug!("SSO message without data, waiting");
        return Verdict::Continue;
    };

    if let Some(token) = data.connection_token() {
        credentials.connection_token = Some(token.to_string());
        persist(store, credentials);
        report(progress, TOKEN_CONFIRMED);
        debug!("Connection token received");
        return Verdict::Continue;
    }

    if let Some(api_key) = data.api_key() {
        credentials.complete(api_key, Utc::now());
        persist(store, credentials);
        report(progress, API_KEY_RECEIVED);
        debug!("API key received");
        return Verdict::Terminal(LinkResult::success(api_key));
    }

    Verdict::Terminal(LinkResult::failure(MISSING_API_KEY))
}

/// Save failures do not change the outcome; the in-memory value is still
/// authoritative for the caller.
pub(crate) fn persist(store: &dyn CredentialStore, credentials: &Credentials) {
    if let Err(e) = store.save(credentials) {
        warn!(error = %e, "Failed to persist SSO credentials");
    }
}
