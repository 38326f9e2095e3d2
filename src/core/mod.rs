//! Pure core of the linker.
//!
//! This module holds everything that does not touch the network:
//! - The `State` trait and the `LinkPhase` enum
//! - Guard predicates and immutable phase history
//! - Wire frames and the message interpreter
//! - The terminal `LinkResult`

pub mod envelope;
mod guard;
mod history;
pub mod interpret;
mod phase;
mod result;
mod state;

pub use envelope::{EnvelopeData, RegistrationFrame, WireEnvelope, PROTOCOL_VERSION};
pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use interpret::{interpret, Verdict};
pub use phase::LinkPhase;
pub use result::LinkResult;
pub use state::State;
