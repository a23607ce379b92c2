//! Transient user notifications.

use std::fmt;

/// A short-lived message for the user, shown apart from shell output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// No network transport is active; nothing was attempted.
    NoNetwork,
    /// The session was established.
    Connected {
        /// `host:port` of the remote end.
        addr: String,
    },
    /// Connecting failed.
    ConnectFailed(String),
    /// Opening the shell failed.
    ShellFailed(String),
    /// Writing a command to the shell failed.
    SendFailed(String),
    /// The session was closed.
    Disconnected,
}

impl Notice {
    /// Whether this notice reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notice::NoNetwork
                | Notice::ConnectFailed(_)
                | Notice::ShellFailed(_)
                | Notice::SendFailed(_)
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoNetwork => write!(f, "check your network connection"),
            Notice::Connected { addr } => write!(f, "connected to {addr}"),
            Notice::ConnectFailed(reason) => write!(f, "connection failed: {reason}"),
            Notice::ShellFailed(reason) => write!(f, "failed to start shell: {reason}"),
            Notice::SendFailed(reason) => write!(f, "failed to send command: {reason}"),
            Notice::Disconnected => write!(f, "disconnected"),
        }
    }
}
