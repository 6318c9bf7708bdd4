//! Start/stop lifecycle

use std::fmt;

/// Lifecycle state of a component
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Inert; the initial state
    #[default]
    Stopped,
    /// Live
    Running,
}

impl LifecycleState {
    /// Check if running
    pub fn is_running(self) -> bool {
        matches!(self, LifecycleState::Running)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Stopped => write!(f, "stopped"),
            LifecycleState::Running => write!(f, "running"),
        }
    }
}

/// Two-state lifecycle. Both transitions are idempotent and a stopped
/// component may be started again.
pub trait Lifecycle {
    /// Current state
    fn state(&self) -> LifecycleState;

    /// Transition to [`LifecycleState::Running`].
    ///
    /// Returns `true` if this call performed the transition.
    fn start(&self) -> bool;

    /// Transition to [`LifecycleState::Stopped`].
    ///
    /// Returns `true` if this call performed the transition.
    fn stop(&self) -> bool;

    /// Check if running
    fn is_running(&self) -> bool {
        self.state().is_running()
    }
}
