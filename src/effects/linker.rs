//! The SSO linking state machine.

use crate::config::LinkConfig;
use crate::core::interpret::{interpret, persist, Verdict};
use crate::core::{Guard, LinkPhase, LinkResult, RegistrationFrame, State, StateHistory, StateTransition};
use crate::effects::CancelSignal;
use crate::ports::{report, BrowserLauncher, ProgressSink, SystemBrowser};
use crate::store::{CredentialStore, Credentials};
use crate::transport::{Transport, TransportError, TransportFactory, TransportMessage, WebSocketTransport};
use chrono::Utc;
use std::sync::Arc;
use tokio::time::{sleep_until, timeout, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const CONNECTING: &str = "Connecting to Nexus Mods SSO...";
pub const REGISTERING: &str = "Registering SSO request...";
pub const AWAITING_APPROVAL: &str = "Waiting for authorisation (browser window opened)...";

pub const CONNECTION_CLOSED: &str = "SSO connection closed before the request completed.";
pub const LINK_CANCELLED: &str = "SSO linking was cancelled.";
pub const LINK_TIMED_OUT: &str = "SSO linking timed out.";

const CLOSE_REASON: &str = "Closing";

/// Result of [`SsoLinker::run`]: the outcome plus the phases it went through.
#[derive(Clone, Debug)]
pub struct LinkOutcome {
    pub result: LinkResult,
    pub history: StateHistory<LinkPhase>,
}

/// Phase bookkeeping for one attempt.
struct Attempt {
    phase: LinkPhase,
    history: StateHistory<LinkPhase>,
    messages: usize,
    open: Guard<LinkPhase>,
}

impl Attempt {
    fn new() -> Self {
        Self {
            phase: LinkPhase::Idle,
            history: StateHistory::new(),
            messages: 0,
            open: Guard::not_final(),
        }
    }

    /// Move to `to`. Final phases are sticky.
    fn advance(&mut self, to: LinkPhase) {
        if !self.open.check(&self.phase) {
            return;
        }
        debug!(from = self.phase.name(), to = to.name(), "SSO phase change");
        self.history = self.history.record(StateTransition {
            from: self.phase,
            to,
            timestamp: Utc::now(),
            messages: self.messages,
        });
        self.phase = to;
    }
}

/// Links a Nexus Mods account by exchanging a request id for an API key.
///
/// One linker can serve many attempts; each attempt gets a fresh transport
/// from the factory. Attempts must not overlap on the same `Credentials`.
///
/// ```no_run
/// use nexus_sso::{CancelSignal, Credentials, JsonFileStore, LinkConfig, SsoLinker};
/// use std::sync::Arc;
///
/// # async fn run() {
/// let store = Arc::new(JsonFileStore::new("sso.json"));
/// let mut credentials = store.load().unwrap_or_default();
/// let linker = SsoLinker::new(LinkConfig::default(), store);
///
/// let result = linker
///     .link_account(&mut credentials, None, &CancelSignal::new())
///     .await;
/// println!("{result}");
/// # }
/// ```
pub struct SsoLinker {
    config: LinkConfig,
    store: Arc<dyn CredentialStore>,
    transports: TransportFactory,
    browser: Arc<dyn BrowserLauncher>,
}

impl SsoLinker {
    /// Linker over WebSockets that opens the system browser.
    pub fn new(config: LinkConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            config,
            store,
            transports: Box::new(|| Box::new(WebSocketTransport::new())),
            browser: Arc::new(SystemBrowser),
        }
    }

    pub fn with_transport<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Transport> + Send + Sync + 'static,
    {
        self.transports = Box::new(factory);
        self
    }

    pub fn with_browser(mut self, browser: Arc<dyn BrowserLauncher>) -> Self {
        self.browser = browser;
        self
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Run one linking attempt and return its outcome.
    ///
    /// Never fails outward: every exit is a [`LinkResult`].
    pub async fn link_account(
        &self,
        credentials: &mut Credentials,
        progress: Option<&dyn ProgressSink>,
        cancel: &CancelSignal,
    ) -> LinkResult {
        self.run(credentials, progress, cancel).await.result
    }

    /// Like [`link_account`](Self::link_account), also returning the phase
    /// history of the attempt.
    pub async fn run(
        &self,
        credentials: &mut Credentials,
        progress: Option<&dyn ProgressSink>,
        cancel: &CancelSignal,
    ) -> LinkOutcome {
        let deadline = Instant::now() + self.config.timeout();
        let mut attempt = Attempt::new();

        let request_id = self.ensure_request_id(credentials);
        info!(request_id = %request_id, "Starting SSO link");

        let frame = RegistrationFrame::new(
            &request_id,
            credentials.connection_token(),
            self.config.protocol,
        );
        let registration = match serde_json::to_string(&frame) {
            Ok(json) => json,
            Err(e) => {
                let result = LinkResult::failure(format!("Unexpected SSO error: {e}"));
                attempt.advance(LinkPhase::terminal_for(&result));
                return LinkOutcome {
                    result,
                    history: attempt.history,
                };
            }
        };

        let mut transport = (self.transports)();

        // Dropping the exchange future is what aborts a pending receive.
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => LinkResult::cancelled(LINK_CANCELLED),
            _ = sleep_until(deadline) => LinkResult::cancelled(LINK_TIMED_OUT),
            exchanged = self.exchange(
                transport.as_mut(),
                &registration,
                &request_id,
                credentials,
                progress,
                &mut attempt,
            ) => match exchanged {
                Ok(result) => result,
                Err(e) => {
                    warn!(error = %e, "SSO transport failed");
                    LinkResult::failure(format!("Unexpected SSO error: {e}"))
                }
            },
        };

        self.close(transport.as_mut()).await;

        attempt.advance(LinkPhase::terminal_for(&result));
        info!(
            outcome = %result,
            messages = attempt.history.messages_handled(),
            elapsed_ms = attempt.history.duration().map_or(0, |d| d.as_millis() as u64),
            "SSO link finished"
        );

        LinkOutcome {
            result,
            history: attempt.history,
        }
    }

    /// Clear the API key and any pending request, then save.
    pub fn unlink(&self, credentials: &mut Credentials) {
        credentials.unlink();
        persist(self.store.as_ref(), credentials);
        info!("SSO account unlinked");
    }

    async fn exchange(
        &self,
        transport: &mut dyn Transport,
        registration: &str,
        request_id: &str,
        credentials: &mut Credentials,
        progress: Option<&dyn ProgressSink>,
        attempt: &mut Attempt,
    ) -> Result<LinkResult, TransportError> {
        attempt.advance(LinkPhase::Connecting);
        report(progress, CONNECTING);
        transport.connect(&self.config.socket_url).await?;
        info!(url = %self.config.socket_url, "Connected to SSO socket");

        report(progress, REGISTERING);
        transport.send(registration).await?;
        info!(resumed = credentials.connection_token().is_some(), "SSO request registered");
        attempt.advance(LinkPhase::Registered);

        report(progress, AWAITING_APPROVAL);
        self.open_authorize_page(request_id);
        attempt.advance(LinkPhase::AwaitingMessage);

        loop {
            let payload = match transport.receive().await? {
                TransportMessage::Closed => return Ok(LinkResult::failure(CONNECTION_CLOSED)),
                TransportMessage::Payload(payload) => payload,
            };

            if payload.trim().is_empty() {
                continue;
            }
            attempt.messages += 1;

            match interpret(&payload, credentials, self.store.as_ref(), progress) {
                Verdict::Continue => continue,
                Verdict::Terminal(result) => return Ok(result),
            }
        }
    }

    /// Reuse the persisted request id, or mint and persist a new one.
    fn ensure_request_id(&self, credentials: &mut Credentials) -> String {
        if let Some(request) = credentials.link_request() {
            debug!(
                has_token = request.connection_token.is_some(),
                "Resuming SSO request"
            );
            return request.request_id.to_string();
        }

        // A token without its request id can never be redeemed.
        if credentials.connection_token().is_some() {
            warn!("Discarding connection token with no request id");
            credentials.connection_token = None;
        }

        let id = Uuid::new_v4().to_string();
        credentials.request_id = Some(id.clone());
        persist(self.store.as_ref(), credentials);
        id
    }

    fn open_authorize_page(&self, request_id: &str) {
        let url = match self.config.authorize_page(request_id) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Cannot build SSO authorize URL");
                return;
            }
        };
        if let Err(e) = self.browser.launch(url.as_str()) {
            warn!(error = %e, url = %url, "Failed to launch browser for SSO approval");
        }
    }

    async fn close(&self, transport: &mut dyn Transport) {
        if !transport.state().needs_close() {
            return;
        }
        if timeout(self.config.close_timeout(), transport.close(CLOSE_REASON))
            .await
            .is_err()
        {
            debug!("SSO socket close timed out");
        }
    }
}
