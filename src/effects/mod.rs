//! Effectful shell around the pure core.
//!
//! This module owns everything with side effects: the socket, the
//! deadline, cancellation, the browser, and persistence calls.
//!
//! # Key Concepts
//!
//! - **Linker**: drives one attempt from connect to a terminal result
//! - **Cancellation**: a shared signal raced against every await point
//! - **Outcome**: the result together with the phase history

mod cancel;
mod linker;

pub use cancel::CancelSignal;
pub use linker::{
    LinkOutcome, SsoLinker, AWAITING_APPROVAL, CONNECTING, CONNECTION_CLOSED, LINK_CANCELLED,
    LINK_TIMED_OUT, REGISTERING,
};
