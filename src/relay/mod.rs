//! Byte relay between a shell stream and the front end.
//!
//! The shell stream is split into a read half, owned by an
//! [`OutputReader`] task publishing decoded text, and a write half, owned
//! by a [`CommandWriter`] task consuming submitted commands. The front end
//! only ever sees channels.
//!
//! # Example
//!
//! ```
//! use sshtool::relay::{Relay, RelayOptions};
//! use tokio::io::{AsyncReadExt, AsyncWriteExt};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (shell_side, mut remote) = tokio::io::duplex(1024);
//! let (notice_tx, _notices) = tokio::sync::mpsc::unbounded_channel();
//! let mut relay = Relay::spawn(shell_side, RelayOptions::default(), notice_tx);
//!
//! relay.send("echo hi").await.unwrap();
//! let mut buf = [0u8; 8];
//! let n = remote.read(&mut buf).await.unwrap();
//! assert_eq!(&buf[..n], b"echo hi\n");
//!
//! remote.write_all(b"hi\n").await.unwrap();
//! assert_eq!(relay.recv().await.as_deref(), Some("hi\n"));
//! # }
//! ```

mod decode;
mod reader;
mod writer;

pub use decode::Utf8Decoder;
pub use reader::{OutputReader, ReaderExit, DEFAULT_READ_BUFFER};
pub use writer::{CommandWriter, LINE_TERMINATOR};

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::SshToolError;
use crate::notice::Notice;
use crate::Result;

/// Relay tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayOptions {
    /// Read buffer size in bytes.
    pub read_buffer: usize,
    /// Capacity of the output and command channels.
    pub channel_capacity: usize,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            read_buffer: DEFAULT_READ_BUFFER,
            channel_capacity: 64,
        }
    }
}

/// A running relay: command sender, output receiver and both tasks.
pub struct Relay {
    commands: mpsc::Sender<String>,
    output: mpsc::Receiver<String>,
    reader: JoinHandle<ReaderExit>,
    writer: JoinHandle<u64>,
}

impl Relay {
    /// Split `stream` and spawn the reader and writer tasks.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S>(stream: S, options: RelayOptions, notices: mpsc::UnboundedSender<Notice>) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        let capacity = options.channel_capacity.max(1);
        let (output_tx, output) = mpsc::channel(capacity);
        let (commands, command_rx) = mpsc::channel(capacity);

        let reader = tokio::spawn(
            OutputReader::new(read_half, output_tx)
                .with_buffer_size(options.read_buffer)
                .run(),
        );
        let writer = tokio::spawn(CommandWriter::new(write_half, command_rx, notices).run());

        Self {
            commands,
            output,
            reader,
            writer,
        }
    }

    /// A sender for submitting commands; may be cloned freely.
    pub fn commands(&self) -> mpsc::Sender<String> {
        self.commands.clone()
    }

    /// Submit one command. The line terminator is appended by the writer.
    pub async fn send(&self, command: impl Into<String>) -> Result<()> {
        self.commands
            .send(command.into())
            .await
            .map_err(|_| SshToolError::ChannelClosed)
    }

    /// Next chunk of shell output, or `None` once the reader has ended.
    pub async fn recv(&mut self) -> Option<String> {
        self.output.recv().await
    }

    /// Whether the reader task has finished.
    pub fn is_finished(&self) -> bool {
        self.reader.is_finished()
    }

    /// Cancel both tasks immediately. In-flight writes are not drained.
    pub fn abort(&self) {
        self.reader.abort();
        self.writer.abort();
    }

    /// Stop accepting commands, let the writer finish, and wait for the
    /// reader to end on its own.
    pub async fn join(self) -> (Option<ReaderExit>, Option<u64>) {
        let Relay {
            commands,
            output,
            reader,
            writer,
        } = self;
        drop(commands);
        drop(output);
        (reader.await.ok(), writer.await.ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_commands_arrive_in_order_unframed() {
        let (shell_side, mut remote) = tokio::io::duplex(256);
        let (notice_tx, _notices) = mpsc::unbounded_channel();
        let relay = Relay::spawn(shell_side, RelayOptions::default(), notice_tx);

        for command in ["first", "second", "third"] {
            relay.send(command).await.unwrap();
        }

        let expected = b"first\nsecond\nthird\n";
        let mut received = vec![0u8; expected.len()];
        tokio::time::timeout(Duration::from_secs(1), remote.read_exact(&mut received))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&received, expected);
    }

    #[tokio::test]
    async fn test_concurrent_senders_share_stream() {
        let (shell_side, mut remote) = tokio::io::duplex(256);
        let (notice_tx, _notices) = mpsc::unbounded_channel();
        let relay = Relay::spawn(shell_side, RelayOptions::default(), notice_tx);

        let enter_key = relay.commands();
        let send_action = relay.commands();
        enter_key.send("a".to_string()).await.unwrap();
        send_action.send("b".to_string()).await.unwrap();

        let mut received = [0u8; 4];
        tokio::time::timeout(Duration::from_secs(1), remote.read_exact(&mut received))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&received, b"a\nb\n");
    }

    #[tokio::test]
    async fn test_output_published_until_eof() {
        let (shell_side, mut remote) = tokio::io::duplex(256);
        let (notice_tx, _notices) = mpsc::unbounded_channel();
        let mut relay = Relay::spawn(shell_side, RelayOptions::default(), notice_tx);

        remote.write_all(b"welcome\r\n").await.unwrap();
        assert_eq!(relay.recv().await.as_deref(), Some("welcome\r\n"));

        drop(remote);
        let end = tokio::time::timeout(Duration::from_secs(1), relay.recv())
            .await
            .unwrap();
        assert!(end.is_none());

        let (reader, _writer) = relay.join().await;
        assert_eq!(reader, Some(ReaderExit::Eof));
    }

    #[tokio::test]
    async fn test_join_reports_reader_exit() {
        let (shell_side, remote) = tokio::io::duplex(64);
        let (notice_tx, _notices) = mpsc::unbounded_channel();
        let relay = Relay::spawn(shell_side, RelayOptions::default(), notice_tx);

        relay.send("exit").await.unwrap();
        drop(remote);

        let (reader, _writer) = tokio::time::timeout(Duration::from_secs(1), relay.join())
            .await
            .unwrap();
        assert!(matches!(
            reader,
            Some(ReaderExit::Eof) | Some(ReaderExit::ReceiverDropped)
        ));
    }

    #[tokio::test]
    async fn test_send_after_abort_fails() {
        let (shell_side, _remote) = tokio::io::duplex(64);
        let (notice_tx, _notices) = mpsc::unbounded_channel();
        let relay = Relay::spawn(shell_side, RelayOptions::default(), notice_tx);

        relay.abort();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let err = relay.send("ls").await.unwrap_err();
        assert!(matches!(err, SshToolError::ChannelClosed));
    }
}
