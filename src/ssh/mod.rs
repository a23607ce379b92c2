//! SSH connection management.
//!
//! Wraps the russh client into a single owned connection object: one
//! session, one interactive shell channel, explicit connect/disconnect.

mod client;
mod host_key;
mod state;

pub use client::{
    ConnectParams, ShellChannel, ShellIo, ShellOptions, SshClient, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_PORT, DEFAULT_SHELL_TIMEOUT, DEFAULT_TERM,
};
pub use host_key::{HostKeyPolicy, HostKeyVerifier};
pub use state::ConnectionState;
