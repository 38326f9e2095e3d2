//! Phase history of a linking attempt.
//!
//! Provides immutable tracking of phase transitions over time, so a caller
//! can see how far an attempt got before it ended.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single phase transition.
///
/// # Example
///
/// ```rust
/// use nexus_sso::core::{LinkPhase, StateTransition};
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: LinkPhase::Idle,
///     to: LinkPhase::Connecting,
///     timestamp: Utc::now(),
///     messages: 0,
/// };
/// assert_eq!(transition.messages, 0);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The phase being left
    pub from: S,
    /// The phase being entered
    pub to: S,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
    /// Server messages handled before this transition
    pub messages: usize,
}

/// Ordered history of phase transitions.
///
/// History is immutable - `record` returns a new history with the
/// transition appended.
///
/// # Example
///
/// ```rust
/// use nexus_sso::core::{LinkPhase, StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let history = StateHistory::new()
///     .record(StateTransition {
///         from: LinkPhase::Idle,
///         to: LinkPhase::Connecting,
///         timestamp: Utc::now(),
///         messages: 0,
///     })
///     .record(StateTransition {
///         from: LinkPhase::Connecting,
///         to: LinkPhase::Failed,
///         timestamp: Utc::now(),
///         messages: 0,
///     });
///
/// let path = history.get_path();
/// assert_eq!(path, vec![&LinkPhase::Idle, &LinkPhase::Connecting, &LinkPhase::Failed]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Phases in the order the attempt visited them, starting with the
    /// phase it left first.
    pub fn get_path(&self) -> Vec<&S> {
        self.transitions
            .first()
            .map(|first| &first.from)
            .into_iter()
            .chain(self.transitions.iter().map(|t| &t.to))
            .collect()
    }

    /// The phase the history ends in, if anything was recorded.
    pub fn last_phase(&self) -> Option<&S> {
        self.transitions.last().map(|t| &t.to)
    }

    /// Whether the attempt ever entered `phase`.
    pub fn reached(&self, phase: &S) -> bool {
        self.transitions.iter().any(|t| &t.to == phase)
    }

    /// Server messages handled by the time of the latest transition.
    pub fn messages_handled(&self) -> usize {
        self.transitions.last().map_or(0, |t| t.messages)
    }

    /// Wall-clock time between the first and latest transition.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.transitions.first()?;
        let last = self.transitions.last()?;
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }
}
