//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use nexus_sso::transport::{Transport, TransportError, TransportMessage, TransportState};
use nexus_sso::{BrowserLauncher, ProgressSink};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

/// Everything a scripted transport saw, shared with the test body.
#[derive(Debug, Default)]
pub struct TransportLog {
    pub connected_to: Vec<String>,
    pub sent: Vec<String>,
    pub close_calls: usize,
    pub receives: usize,
}

/// What a `ScriptedTransport` does when its script runs out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WhenDrained {
    /// Report the peer as gone.
    Close,
    /// Never resolve.
    Hang,
}

pub enum Step {
    Deliver(TransportMessage),
    Fail(String),
}

/// Transport that replays a fixed script of inbound messages.
pub struct ScriptedTransport {
    script: VecDeque<Step>,
    drained: WhenDrained,
    fail_connect: Option<String>,
    hang_on_close: bool,
    state: TransportState,
    log: Arc<Mutex<TransportLog>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Step>, drained: WhenDrained) -> (Self, Arc<Mutex<TransportLog>>) {
        let log = Arc::new(Mutex::new(TransportLog::default()));
        let transport = Self {
            script: script.into(),
            drained,
            fail_connect: None,
            hang_on_close: false,
            state: TransportState::Closed,
            log: Arc::clone(&log),
        };
        (transport, log)
    }

    pub fn failing_connect(reason: &str) -> (Self, Arc<Mutex<TransportLog>>) {
        let (mut transport, log) = Self::new(Vec::new(), WhenDrained::Close);
        transport.fail_connect = Some(reason.to_string());
        (transport, log)
    }

    /// `close` never completes, like a peer that ignores the close frame.
    pub fn hang_on_close(mut self) -> Self {
        self.hang_on_close = true;
        self
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn connect(&mut self, url: &str) -> Result<(), TransportError> {
        self.log.lock().unwrap().connected_to.push(url.to_string());
        if let Some(reason) = &self.fail_connect {
            return Err(TransportError::Connect {
                url: url.to_string(),
                reason: reason.clone(),
            });
        }
        self.state = TransportState::Open;
        Ok(())
    }

    async fn send(&mut self, text: &str) -> Result<(), TransportError> {
        if self.state != TransportState::Open {
            return Err(TransportError::NotConnected);
        }
        self.log.lock().unwrap().sent.push(text.to_string());
        Ok(())
    }

    async fn receive(&mut self) -> Result<TransportMessage, TransportError> {
        self.log.lock().unwrap().receives += 1;
        match self.script.pop_front() {
            Some(Step::Deliver(TransportMessage::Closed)) => {
                self.state = TransportState::Closing;
                Ok(TransportMessage::Closed)
            }
            Some(Step::Deliver(message)) => Ok(message),
            Some(Step::Fail(reason)) => Err(TransportError::Receive(reason)),
            None => match self.drained {
                WhenDrained::Close => {
                    self.state = TransportState::Closing;
                    Ok(TransportMessage::Closed)
                }
                WhenDrained::Hang => std::future::pending().await,
            },
        }
    }

    async fn close(&mut self, _reason: &str) {
        self.log.lock().unwrap().close_calls += 1;
        if self.hang_on_close {
            std::future::pending::<()>().await;
        }
        self.state = TransportState::Closed;
    }

    fn state(&self) -> TransportState {
        self.state
    }
}

/// Wrap a single prepared transport in a factory. A second attempt from
/// the same factory panics.
pub fn once(transport: ScriptedTransport) -> impl Fn() -> Box<dyn Transport> + Send + Sync {
    let slot = Mutex::new(Some(transport));
    move || {
        let transport = slot
            .lock()
            .unwrap()
            .take()
            .expect("factory used more than once");
        Box::new(transport) as Box<dyn Transport>
    }
}

pub fn payload(json: &str) -> Step {
    Step::Deliver(TransportMessage::Payload(json.to_string()))
}

pub fn token_frame(token: &str) -> Step {
    payload(&format!(
        r#"{{"success":true,"data":{{"connection_token":"{token}"}},"error":null}}"#
    ))
}

pub fn api_key_frame(key: &str) -> Step {
    payload(&format!(
        r#"{{"success":true,"data":{{"api_key":"{key}"}},"error":null}}"#
    ))
}

#[derive(Default)]
pub struct RecordingProgress {
    lines: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }
}

#[derive(Default)]
pub struct RecordingBrowser {
    urls: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingBrowser {
    pub fn failing() -> Self {
        Self {
            urls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl BrowserLauncher for RecordingBrowser {
    fn launch(&self, url: &str) -> io::Result<()> {
        self.urls.lock().unwrap().push(url.to_string());
        if self.fail {
            Err(io::Error::new(io::ErrorKind::NotFound, "no browser"))
        } else {
            Ok(())
        }
    }
}
