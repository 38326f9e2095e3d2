//! Core State trait for linking phases.
//!
//! Phases are plain values; inspecting them has no side effects.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for state machine phases.
///
/// All methods are pure. A phase describes where a linking attempt
/// currently is, nothing more.
///
/// # Required Traits
///
/// - `Clone`: phases are copied into the attempt history
/// - `PartialEq`: guards and tests compare phases
/// - `Debug`: phases appear in log fields
/// - `Serialize` + `Deserialize`: histories can be stored for diagnostics
///
/// Most implementations come from the [`state_enum!`](crate::state_enum) macro.
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the phase's name for display/logging.
    fn name(&self) -> &str;

    /// Check if this is a final (terminal) phase.
    ///
    /// No transition may leave a final phase.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }

    /// Check if this is an error phase.
    ///
    /// Error phases are typically also final, but this is not enforced.
    ///
    /// Default implementation returns `false`.
    fn is_error(&self) -> bool {
        false
    }
}
