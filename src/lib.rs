//! nexus-sso: Nexus Mods single-sign-on account linking
//!
//! A desktop client links a Nexus Mods account by registering a request id
//! over the SSO WebSocket, sending the user to an approval page, and
//! waiting for the server to hand back an API key.
//!
//! The crate follows a "pure core, imperative shell" split:
//!
//! - **core**: phases, history, wire frames, and the message interpreter
//! - **effects**: the linker that owns the socket, deadline and cancellation
//! - **transport**: the socket port and its WebSocket implementation
//! - **store**: persisted credentials so an interrupted attempt can resume
//! - **config**: endpoints and timeouts, validated all at once
//!
//! # Example
//!
//! ```no_run
//! use nexus_sso::{CancelSignal, LinkConfig, MemoryStore, SsoLinker};
//! use nexus_sso::store::Credentials;
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let linker = SsoLinker::new(LinkConfig::default(), Arc::new(MemoryStore::new()));
//! let mut credentials = Credentials::default();
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();
//!
//! let result = linker
//!     .link_account(&mut credentials, Some(&tx), &CancelSignal::new())
//!     .await;
//! while let Ok(line) = rx.try_recv() {
//!     println!("{line}");
//! }
//! println!("{result}");
//! # }
//! ```

#[macro_use]
mod macros;

pub mod config;
pub mod core;
pub mod effects;
pub mod ports;
pub mod store;
pub mod transport;

// Re-export commonly used types
pub use config::{LinkConfig, LinkConfigBuilder};
pub use core::{LinkPhase, LinkResult, State, StateHistory};
pub use effects::{CancelSignal, LinkOutcome, SsoLinker};
pub use ports::{BrowserLauncher, ProgressSink, SystemBrowser};
pub use store::{CredentialStore, Credentials, JsonFileStore, LinkStatus, MemoryStore};
pub use transport::{Transport, TransportError, TransportMessage, TransportState};
