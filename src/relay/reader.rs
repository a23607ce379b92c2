//! Shell output reader task.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tracing::{debug, error, trace};

use super::decode::Utf8Decoder;

/// Default read buffer size in bytes.
pub const DEFAULT_READ_BUFFER: usize = 1024;

/// Why the reader loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderExit {
    /// The stream signalled end-of-data.
    Eof,
    /// The output receiver was dropped.
    ReceiverDropped,
    /// A read failed; the error was logged.
    Failed(std::io::ErrorKind),
}

/// Reads shell output and publishes it as text.
///
/// Sole reader of the stream for the lifetime of the shell channel.
pub struct OutputReader<R: AsyncRead + Unpin + Send + 'static> {
    reader: R,
    tx: mpsc::Sender<String>,
    buffer_size: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> OutputReader<R> {
    /// Create a new OutputReader.
    ///
    /// # Arguments
    ///
    /// * `reader` - Read half of the shell stream.
    /// * `tx` - Channel sender for decoded output.
    pub fn new(reader: R, tx: mpsc::Sender<String>) -> Self {
        Self {
            reader,
            tx,
            buffer_size: DEFAULT_READ_BUFFER,
        }
    }

    /// Create with custom buffer size.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Run the read loop until end-of-data, a read error, or until
    /// nobody is listening.
    pub async fn run(self) -> ReaderExit {
        let mut reader = self.reader;
        let tx = self.tx;
        let mut buf = vec![0u8; self.buffer_size];
        let mut decoder = Utf8Decoder::new();

        let exit = loop {
            match reader.read(&mut buf).await {
                Ok(0) => {
                    debug!("shell reader: EOF");
                    break ReaderExit::Eof;
                }
                Ok(n) => {
                    trace!(bytes = n, "shell reader: read");
                    let text = decoder.decode(&buf[..n]);
                    if text.is_empty() {
                        continue;
                    }
                    if tx.send(text).await.is_err() {
                        debug!("shell reader: output channel closed");
                        return ReaderExit::ReceiverDropped;
                    }
                }
                Err(e) => {
                    error!(error = %e, "shell reader: read failed");
                    break ReaderExit::Failed(e.kind());
                }
            }
        };

        let rest = decoder.finish();
        if !rest.is_empty() && tx.send(rest).await.is_err() {
            return ReaderExit::ReceiverDropped;
        }

        exit
    }
}
