//! WebSocket transport over tokio-tungstenite.

use super::{Transport, TransportError, TransportMessage, TransportState};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Client socket for `ws://` and `wss://` endpoints.
///
/// Fragmented frames are reassembled by tungstenite, so every payload
/// handed out is a whole message. Pings are answered by tungstenite while
/// reading.
pub struct WebSocketTransport {
    socket: Option<Socket>,
    state: TransportState,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        Self {
            socket: None,
            state: TransportState::Closed,
        }
    }

    fn socket(&mut self) -> Result<&mut Socket, TransportError> {
        self.socket.as_mut().ok_or(TransportError::NotConnected)
    }
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&mut self, url: &str) -> Result<(), TransportError> {
        let (socket, response) =
            connect_async(url)
                .await
                .map_err(|e| TransportError::Connect {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;
        debug!(status = %response.status(), "WebSocket handshake complete");
        self.socket = Some(socket);
        self.state = TransportState::Open;
        Ok(())
    }

    async fn send(&mut self, text: &str) -> Result<(), TransportError> {
        self.socket()?
            .send(Message::Text(text.to_string()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn receive(&mut self) -> Result<TransportMessage, TransportError> {
        loop {
            let next = self.socket()?.next().await;
            match next {
                Some(Ok(Message::Text(text))) => return Ok(TransportMessage::Payload(text)),
                Some(Ok(Message::Binary(bytes))) => {
                    return Ok(TransportMessage::Payload(
                        String::from_utf8_lossy(&bytes).into_owned(),
                    ))
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "Peer closed the SSO socket");
                    self.state = TransportState::Closing;
                    return Ok(TransportMessage::Closed);
                }
                Some(Ok(other)) => {
                    trace!(kind = ?other, "Skipping control frame");
                }
                Some(Err(e)) => return Err(TransportError::Receive(e.to_string())),
                None => {
                    self.state = TransportState::Closed;
                    return Ok(TransportMessage::Closed);
                }
            }
        }
    }

    async fn close(&mut self, reason: &str) {
        if let Some(mut socket) = self.socket.take() {
            let frame = CloseFrame {
                code: CloseCode::Normal,
                reason: reason.to_owned().into(),
            };
            if let Err(e) = socket.close(Some(frame)).await {
                debug!(error = %e, "WebSocket close handshake failed");
            }
        }
        self.state = TransportState::Closed;
    }

    fn state(&self) -> TransportState {
        self.state
    }
}
