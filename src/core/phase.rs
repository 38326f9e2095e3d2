//! Phases of a single linking attempt.

use crate::core::LinkResult;

crate::state_enum! {
    /// Where a linking attempt currently is.
    ///
    /// An attempt walks `Idle -> Connecting -> Registered -> AwaitingMessage`
    /// and ends in exactly one of the final phases. Deadline or cancellation
    /// may cut the walk short from any non-final phase.
    #[derive(Copy, Eq, Hash)]
    pub enum LinkPhase {
        Idle,
        Connecting,
        Registered,
        AwaitingMessage,
        Linked,
        Failed,
        Cancelled,
    }
    final: [Linked, Failed, Cancelled]
    error: [Failed]
}

impl LinkPhase {
    /// The final phase matching a terminal result.
    pub fn terminal_for(result: &LinkResult) -> Self {
        match result {
            LinkResult::Success { .. } => Self::Linked,
            LinkResult::Failure { .. } => Self::Failed,
            LinkResult::Cancelled { .. } => Self::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::State;

    #[test]
    fn only_outcomes_are_final() {
        let open = [
            LinkPhase::Idle,
            LinkPhase::Connecting,
            LinkPhase::Registered,
            LinkPhase::AwaitingMessage,
        ];
        assert!(open.iter().all(|p| !p.is_final()));
        assert!(LinkPhase::Linked.is_final());
        assert!(LinkPhase::Failed.is_final());
        assert!(LinkPhase::Cancelled.is_final());
    }

    #[test]
    fn cancelled_is_not_an_error() {
        assert!(LinkPhase::Failed.is_error());
        assert!(!LinkPhase::Cancelled.is_error());
        assert!(!LinkPhase::Linked.is_error());
    }

    #[test]
    fn terminal_for_maps_each_result() {
        assert_eq!(
            LinkPhase::terminal_for(&LinkResult::success("k")),
            LinkPhase::Linked
        );
        assert_eq!(
            LinkPhase::terminal_for(&LinkResult::failure("x")),
            LinkPhase::Failed
        );
        assert_eq!(
            LinkPhase::terminal_for(&LinkResult::cancelled("x")),
            LinkPhase::Cancelled
        );
    }

    #[test]
    fn names_match_variants() {
        assert_eq!(LinkPhase::AwaitingMessage.name(), "AwaitingMessage");
    }
}
