//! # sshtool
//!
//! Minimal SSH shell relay.
//!
//! Opens one authenticated SSH session, starts one interactive shell on a
//! pseudo-terminal, and relays lines in and output out over channels. All
//! protocol work is done by [`russh`]; this crate only supplies
//! credentials, a host key policy, and the relay plumbing.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sshtool::{ConnectParams, Controller, HostKeyPolicy, RelayOptions, ShellOptions};
//! use sshtool::network::FixedProbe;
//!
//! #[tokio::main]
//! async fn main() -> sshtool::Result<()> {
//!     sshtool::logging::try_init().ok();
//!
//!     let (notice_tx, mut notices) = tokio::sync::mpsc::unbounded_channel();
//!     let mut controller = Controller::new(FixedProbe::assumed(), notice_tx);
//!
//!     let params = ConnectParams::new("10.0.0.5", "admin", "secret")
//!         .with_host_key(HostKeyPolicy::pinned(["SHA256:YsuxPqNqMCZOTV6eAKUMiyXIhiNyUkJ6FE1Ik5o0rtw"]));
//!     controller.connect(&params).await?;
//!
//!     let mut relay = controller
//!         .start_shell(&ShellOptions::default(), RelayOptions::default())
//!         .await?;
//!     relay.send("uname -a").await?;
//!     if let Some(output) = relay.recv().await {
//!         print!("{output}");
//!     }
//!
//!     controller.shutdown().await;
//!     while let Ok(notice) = notices.try_recv() {
//!         eprintln!("{notice}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod console;
pub mod controller;
pub mod error;
pub mod logging;
pub mod network;
pub mod notice;
pub mod output;
pub mod relay;
pub mod ssh;

// Re-export commonly used types
pub use console::{ConsoleExit, ConsoleOptions};
pub use controller::Controller;
pub use error::{Result, SshToolError};
pub use network::{NetworkProbe, Transport};
pub use notice::Notice;
pub use output::OutputSanitizer;
pub use relay::{Relay, RelayOptions, ReaderExit};
pub use ssh::{ConnectParams, ConnectionState, HostKeyPolicy, ShellChannel, ShellOptions, SshClient};
