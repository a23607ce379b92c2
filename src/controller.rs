//! Front-end controller tying the network check, the connection manager
//! and the relay together.
//!
//! Every outcome the user should see is published as a [`Notice`]; errors
//! are also returned to the caller.

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::SshToolError;
use crate::network::NetworkProbe;
use crate::notice::Notice;
use crate::relay::{Relay, RelayOptions};
use crate::ssh::{ConnectParams, ConnectionState, ShellOptions, SshClient};
use crate::Result;

/// Drives one connection from the front end.
pub struct Controller<P: NetworkProbe> {
    probe: P,
    client: SshClient,
    notices: mpsc::UnboundedSender<Notice>,
}

impl<P: NetworkProbe> Controller<P> {
    /// Create a controller publishing notices on `notices`.
    pub fn new(probe: P, notices: mpsc::UnboundedSender<Notice>) -> Self {
        Self {
            probe,
            client: SshClient::new(),
            notices,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.client.state()
    }

    /// Check the network and connect.
    ///
    /// With no active transport nothing is attempted.
    pub async fn connect(&mut self, params: &ConnectParams) -> Result<()> {
        let Some(transport) = self.probe.active_transport() else {
            warn!("no active network transport; not connecting");
            self.notify(Notice::NoNetwork);
            return Err(SshToolError::NoNetwork);
        };
        info!(%transport, addr = %params.addr(), "network available, connecting");

        if self.client.is_connected() {
            self.client.disconnect().await;
            self.notify(Notice::Disconnected);
        }

        match self.client.connect(params).await {
            Ok(()) => {
                self.notify(Notice::Connected {
                    addr: params.addr(),
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "connection failed");
                self.notify(Notice::ConnectFailed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Open the shell and start relaying it.
    pub async fn start_shell(
        &mut self,
        shell: &ShellOptions,
        relay: RelayOptions,
    ) -> Result<Relay> {
        match self.client.open_shell(shell).await {
            Ok(channel) => Ok(Relay::spawn(
                channel.into_stream(),
                relay,
                self.notices.clone(),
            )),
            Err(e) => {
                warn!(error = %e, "shell start failed");
                self.notify(Notice::ShellFailed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Disconnect. Safe to call at any time.
    pub async fn shutdown(&mut self) {
        if self.client.is_connected() {
            self.client.disconnect().await;
            self.notify(Notice::Disconnected);
        }
    }

    fn notify(&self, notice: Notice) {
        let _ = self.notices.send(notice);
    }
}
