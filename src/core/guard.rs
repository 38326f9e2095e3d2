//! Guard predicates for controlling phase transitions.
//!
//! Guards are pure boolean functions that decide whether a transition may
//! leave a phase.

use super::state::State;
use std::marker::PhantomData;
use std::sync::Arc;

/// Pure predicate that determines if a transition can execute.
///
/// # Example
///
/// ```rust
/// use nexus_sso::core::{Guard, LinkPhase, State};
///
/// let open = Guard::new(|phase: &LinkPhase| !phase.is_final());
///
/// assert!(open.check(&LinkPhase::AwaitingMessage));
/// assert!(!open.check(&LinkPhase::Linked));
/// ```
pub struct Guard<S: State> {
    predicate: Arc<dyn Fn(&S) -> bool + Send + Sync>,
    _phantom: PhantomData<S>,
}

impl<S: State> Guard<S> {
    /// Create a guard from a pure predicate function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
            _phantom: PhantomData,
        }
    }

    /// Guard that only lets non-final phases transition.
    pub fn not_final() -> Self
    where
        S: 'static,
    {
        Self::new(|s: &S| !s.is_final())
    }

    /// Check if the guard allows a transition from this phase.
    pub fn check(&self, state: &S) -> bool {
        (self.predicate)(state)
    }
}

impl<S: State> Clone for Guard<S> {
    fn clone(&self) -> Self {
        Guard {
            predicate: Arc::clone(&self.predicate),
            _phantom: PhantomData,
        }
    }
}
