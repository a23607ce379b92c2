//! Connection state machine.

/// Lifecycle state of an [`SshClient`](super::SshClient).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No session exists.
    #[default]
    Disconnected,
    /// An authenticated session exists, no shell has been opened yet.
    Connected,
    /// The session's single shell channel is open.
    ShellOpen,
}

impl ConnectionState {
    /// Check if transition to target state is valid.
    ///
    /// Valid transitions:
    /// - Disconnected -> Connected
    /// - Connected -> ShellOpen
    /// - Connected -> Disconnected
    /// - ShellOpen -> Disconnected
    pub fn can_transition_to(&self, target: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (*self, target),
            (Disconnected, Connected)
                | (Connected, ShellOpen)
                | (Connected, Disconnected)
                | (ShellOpen, Disconnected)
        )
    }

    /// Attempt to transition to a new state.
    ///
    /// Returns `Ok(())` if the transition is valid, or an error otherwise.
    pub fn transition_to(&mut self, target: ConnectionState) -> crate::Result<()> {
        if self.can_transition_to(target) {
            *self = target;
            Ok(())
        } else {
            Err(crate::error::SshToolError::InvalidStateTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// Check if a session is alive.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected | ConnectionState::ShellOpen)
    }
}
