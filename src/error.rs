//! Error types for sshtool.

use std::time::Duration;

use thiserror::Error;

/// Main error type for sshtool operations.
#[derive(Error, Debug)]
pub enum SshToolError {
    /// No usable network transport was found, so no connection was attempted.
    #[error("no active network transport")]
    NoNetwork,

    /// An operation needed a session but none is open.
    #[error("not connected")]
    NotConnected,

    /// The TCP connect, handshake and authentication did not finish in time.
    #[error("connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// The remote host could not be reached or the handshake failed.
    #[error("failed to connect to {addr}: {reason}")]
    Connect { addr: String, reason: String },

    /// The server refused the supplied credentials.
    #[error("authentication rejected for user {user}")]
    AuthRejected { user: String },

    /// The server presented a host key that the policy does not trust.
    #[error("host key {fingerprint} is not trusted")]
    HostKeyRejected { fingerprint: String },

    /// Opening the shell channel failed.
    #[error("failed to open shell: {0}")]
    ShellOpen(String),

    /// Opening the shell channel did not finish in time.
    #[error("shell open timed out after {0:?}")]
    ShellTimeout(Duration),

    /// Invalid connection state transition attempted.
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        from: crate::ssh::ConnectionState,
        to: crate::ssh::ConnectionState,
    },

    /// Error reported by the SSH library.
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Relay channel closed.
    #[error("channel closed")]
    ChannelClosed,

    /// Connection parameters are unusable.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

/// Convenience Result type for sshtool operations.
pub type Result<T> = std::result::Result<T, SshToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_key_rejected_display() {
        let err = SshToolError::HostKeyRejected {
            fingerprint: "SHA256:abc".into(),
        };
        assert!(err.to_string().contains("SHA256:abc"));
        assert!(err.to_string().contains("not trusted"));
    }

    #[test]
    fn test_auth_rejected_display() {
        let err = SshToolError::AuthRejected {
            user: "alice".into(),
        };
        assert!(err.to_string().contains("alice"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: SshToolError = io_err.into();
        assert!(matches!(err, SshToolError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_timeout_display() {
        let err = SshToolError::ConnectTimeout(Duration::from_secs(10));
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("10s"));
    }

    #[test]
    fn test_connect_display() {
        let err = SshToolError::Connect {
            addr: "10.0.0.1:22".into(),
            reason: "connection refused".into(),
        };
        assert!(err.to_string().contains("10.0.0.1:22"));
        assert!(err.to_string().contains("connection refused"));
    }
}
