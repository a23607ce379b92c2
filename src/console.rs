//! Line-oriented console front end for a running [`Relay`].
//!
//! Each input line is one command. Shell output is written to a sink,
//! optionally through an [`OutputSanitizer`]. The loop ends when the
//! remote side closes, when input has closed and output has gone idle, or
//! when interrupted.

use std::future::Future;
use std::io::{BufRead, BufReader};
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::output::OutputSanitizer;
use crate::relay::Relay;
use crate::Result;

/// How long output keeps flowing after input closes.
pub const STDIN_EOF_LINGER: Duration = Duration::from_millis(500);

/// Why [`run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    /// The shell closed its output.
    RemoteClosed,
    /// Input closed and output stayed idle for the linger period.
    InputDrained,
    /// The interrupt future completed.
    Interrupted,
}

/// Console settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleOptions {
    /// Strip ANSI escapes before writing to the sink.
    pub strip_ansi: bool,
    /// Idle period after input closes before giving up on output.
    pub linger: Duration,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            strip_ansi: false,
            linger: STDIN_EOF_LINGER,
        }
    }
}

/// Pump `lines` into the relay and relay output into `sink`.
pub async fn run<W, F>(
    relay: &mut Relay,
    mut lines: mpsc::Receiver<String>,
    sink: &mut W,
    options: ConsoleOptions,
    interrupt: F,
) -> Result<ConsoleExit>
where
    W: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    let mut sanitizer = options.strip_ansi.then(OutputSanitizer::new);
    let mut linger: Option<Instant> = None;
    tokio::pin!(interrupt);

    loop {
        let deadline = linger.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

        tokio::select! {
            chunk = relay.recv() => match chunk {
                Some(text) => {
                    let text = match sanitizer.as_mut() {
                        Some(sanitizer) => sanitizer.push(&text),
                        None => text,
                    };
                    sink.write_all(text.as_bytes()).await?;
                    sink.flush().await?;
                    if linger.is_some() {
                        linger = Some(Instant::now() + options.linger);
                    }
                }
                None => {
                    info!("remote shell closed");
                    return Ok(ConsoleExit::RemoteClosed);
                }
            },
            line = lines.recv(), if linger.is_none() => match line {
                Some(line) => relay.send(line).await?,
                None => {
                    debug!("input closed, draining output");
                    linger = Some(Instant::now() + options.linger);
                }
            },
            _ = tokio::time::sleep_until(deadline), if linger.is_some() => {
                debug!("output idle after input closed");
                return Ok(ConsoleExit::InputDrained);
            }
            _ = &mut interrupt => {
                info!("interrupted");
                return Ok(ConsoleExit::Interrupted);
            }
        }
    }
}

/// Read process stdin on a dedicated thread; one message per line.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    spawn_line_reader(BufReader::new(std::io::stdin()))
}

/// Read `input` on a dedicated thread, one message per line.
///
/// Line terminators are stripped and invalid UTF-8 is replaced rather
/// than ending the stream. Only end of input or an I/O error stops it.
pub fn spawn_line_reader<R>(mut input: R) -> mpsc::Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);

    std::thread::spawn(move || {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match input.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let line = trim_line_end(&buf);
                    let line = String::from_utf8_lossy(line).into_owned();
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to read input");
                    break;
                }
            }
        }
    });

    rx
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
