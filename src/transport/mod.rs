//! Duplex message transport consumed by the linker.
//!
//! The linker only needs whole text messages in order, plus a way to tell
//! whether a close handshake is still worth attempting. [`WebSocketTransport`]
//! is the default implementation.

use async_trait::async_trait;
use thiserror::Error;

mod websocket;

pub use websocket::WebSocketTransport;

/// One complete logical message, reassembled from however many frames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportMessage {
    /// The peer closed the connection.
    Closed,
    Payload(String),
}

/// Connection state as seen by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportState {
    Open,
    /// The peer sent a close frame; ours is still owed.
    Closing,
    /// Never opened, or fully closed.
    Closed,
}

impl TransportState {
    /// Whether `close` has anything left to do.
    pub fn needs_close(self) -> bool {
        matches!(self, Self::Open | Self::Closing)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("failed to send: {0}")]
    Send(String),

    #[error("failed to receive: {0}")]
    Receive(String),

    #[error("transport is not connected")]
    NotConnected,
}

/// Duplex, message-oriented connection.
///
/// `receive` must be cancel-safe: the linker drops its future when the
/// deadline or the caller's cancellation wins the race.
#[async_trait]
pub trait Transport: Send {
    async fn connect(&mut self, url: &str) -> Result<(), TransportError>;

    async fn send(&mut self, text: &str) -> Result<(), TransportError>;

    async fn receive(&mut self) -> Result<TransportMessage, TransportError>;

    /// Best-effort close. Implementations swallow and log their own errors.
    async fn close(&mut self, reason: &str);

    fn state(&self) -> TransportState;
}

/// Produces a fresh transport for each attempt.
pub type TransportFactory = Box<dyn Fn() -> Box<dyn Transport> + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_live_states_need_close() {
        assert!(TransportState::Open.needs_close());
        assert!(TransportState::Closing.needs_close());
        assert!(!TransportState::Closed.needs_close());
    }

    #[test]
    fn errors_carry_detail() {
        let err = TransportError::Connect {
            url: "wss://sso.example".to_string(),
            reason: "dns failure".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to connect to wss://sso.example: dns failure"
        );
    }
}
