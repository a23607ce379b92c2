//! Command writer task.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::notice::Notice;

/// Line terminator appended to every command.
pub const LINE_TERMINATOR: &str = "\n";

/// Writes submitted commands to the shell.
///
/// A failed write is reported as [`Notice::SendFailed`] and the loop
/// moves on to the next command.
pub struct CommandWriter<W: AsyncWrite + Unpin + Send + 'static> {
    writer: W,
    rx: mpsc::Receiver<String>,
    notices: mpsc::UnboundedSender<Notice>,
}

impl<W: AsyncWrite + Unpin + Send + 'static> CommandWriter<W> {
    /// Create a new CommandWriter.
    ///
    /// # Arguments
    ///
    /// * `writer` - Write half of the shell stream.
    /// * `rx` - Channel receiver for commands.
    /// * `notices` - Where write failures are reported.
    pub fn new(
        writer: W,
        rx: mpsc::Receiver<String>,
        notices: mpsc::UnboundedSender<Notice>,
    ) -> Self {
        Self {
            writer,
            rx,
            notices,
        }
    }

    /// Run until every command sender has been dropped.
    ///
    /// Returns the number of commands written successfully.
    pub async fn run(self) -> u64 {
        let mut writer = self.writer;
        let mut rx = self.rx;
        let notices = self.notices;
        let mut sent = 0u64;

        while let Some(command) = rx.recv().await {
            let line = format!("{command}{LINE_TERMINATOR}");
            trace!(bytes = line.len(), "shell writer: writing");

            match write_line(&mut writer, line.as_bytes()).await {
                Ok(()) => {
                    sent += 1;
                    debug!("shell writer: command sent");
                }
                Err(e) => {
                    warn!(error = %e, "shell writer: failed to send command");
                    let _ = notices.send(Notice::SendFailed(e.to_string()));
                }
            }
        }

        debug!(sent, "shell writer: command channel closed");
        sent
    }
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &[u8]) -> std::io::Result<()> {
    writer.write_all(line).await?;
    writer.flush().await
}
