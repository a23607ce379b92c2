//! Connection manager owning one SSH session and its shell channel.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use russh::client::{self, Handle};
use russh::Disconnect;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::host_key::{HostKeyPolicy, HostKeyVerifier};
use super::state::ConnectionState;
use crate::error::SshToolError;
use crate::Result;

/// Default SSH port.
pub const DEFAULT_PORT: u16 = 22;

/// Default bound on connect + handshake + authentication.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Default bound on opening the shell channel.
pub const DEFAULT_SHELL_TIMEOUT: Duration = Duration::from_millis(3_000);

/// Default PTY terminal type.
pub const DEFAULT_TERM: &str = "xterm";

const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Parameters for opening a session.
#[derive(Clone)]
pub struct ConnectParams {
    /// Remote host name or address.
    pub host: String,
    /// Remote port.
    pub port: u16,
    /// Login user.
    pub username: String,
    /// Password for password authentication.
    pub password: String,
    /// Bound on connect, handshake and authentication together.
    pub connect_timeout: Duration,
    /// SSH keepalive interval, if any.
    pub keepalive_interval: Option<Duration>,
    /// Host key verification policy.
    pub host_key: HostKeyPolicy,
}

impl ConnectParams {
    /// Create parameters for `username@host:22` with default timeouts.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: username.into(),
            password: password.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            keepalive_interval: None,
            host_key: HostKeyPolicy::default(),
        }
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, limit: Duration) -> Self {
        self.connect_timeout = limit;
        self
    }

    /// Set the host key policy.
    pub fn with_host_key(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key = policy;
        self
    }

    /// `host:port` for logging and errors.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(SshToolError::InvalidParams("host is required".into()));
        }
        if self.username.trim().is_empty() {
            return Err(SshToolError::InvalidParams("username is required".into()));
        }
        if self.port == 0 {
            return Err(SshToolError::InvalidParams("port must be non-zero".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("keepalive_interval", &self.keepalive_interval)
            .field("host_key", &self.host_key)
            .finish()
    }
}

/// How the shell channel is requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOptions {
    /// Request a pseudo-terminal before starting the shell.
    pub pty: bool,
    /// Terminal type sent with the PTY request.
    pub term: String,
    /// PTY width in columns.
    pub cols: u32,
    /// PTY height in rows.
    pub rows: u32,
    /// Bound on channel open + PTY + shell requests.
    pub open_timeout: Duration,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            pty: true,
            term: DEFAULT_TERM.to_string(),
            cols: 80,
            rows: 24,
            open_timeout: DEFAULT_SHELL_TIMEOUT,
        }
    }
}

/// Duplex byte stream of an open shell.
pub trait ShellIo: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> ShellIo for T {}

/// An open interactive shell channel.
pub struct ShellChannel {
    stream: Box<dyn ShellIo>,
    pty: bool,
}

impl ShellChannel {
    /// Wrap a duplex stream as a shell channel.
    pub fn new(stream: impl ShellIo + 'static, pty: bool) -> Self {
        Self {
            stream: Box::new(stream),
            pty,
        }
    }

    /// Whether a PTY was allocated for this shell.
    pub fn has_pty(&self) -> bool {
        self.pty
    }

    /// Take the duplex stream.
    pub fn into_stream(self) -> Box<dyn ShellIo> {
        self.stream
    }
}

impl fmt::Debug for ShellChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShellChannel").field("pty", &self.pty).finish()
    }
}

struct Session {
    handle: Handle<HostKeyVerifier>,
    addr: String,
    username: String,
}

/// Owns at most one SSH session and the single shell opened on it.
///
/// The session is created by [`connect`](Self::connect) and released by
/// [`disconnect`](Self::disconnect) or when the client is dropped.
#[derive(Default)]
pub struct SshClient {
    session: Option<Session>,
    state: ConnectionState,
}

impl SshClient {
    /// Create a client with no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether a session is alive.
    pub fn is_connected(&self) -> bool {
        self.session.is_some() && self.state.is_connected()
    }

    /// Open and authenticate a session.
    ///
    /// An existing session is torn down first. On failure the client is
    /// left disconnected.
    pub async fn connect(&mut self, params: &ConnectParams) -> Result<()> {
        params.validate()?;

        if self.session.is_some() {
            debug!("replacing existing session");
            self.disconnect().await;
        }

        let limit = params.connect_timeout;
        info!(addr = %params.addr(), user = %params.username, "connecting");

        let session = match timeout(limit, establish(params)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(addr = %params.addr(), ?limit, "connection timed out");
                return Err(SshToolError::ConnectTimeout(limit));
            }
        };

        self.state.transition_to(ConnectionState::Connected)?;
        info!(addr = %session.addr, user = %session.username, "session established");
        self.session = Some(session);
        Ok(())
    }

    /// Open the interactive shell channel on the current session.
    pub async fn open_shell(&mut self, options: &ShellOptions) -> Result<ShellChannel> {
        let session = self.session.as_ref().ok_or(SshToolError::NotConnected)?;

        let mut next = self.state;
        next.transition_to(ConnectionState::ShellOpen)?;

        let limit = options.open_timeout;
        debug!(addr = %session.addr, pty = options.pty, term = %options.term, "opening shell channel");

        let channel = match timeout(limit, request_shell(&session.handle, options)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(addr = %session.addr, ?limit, "shell open timed out");
                return Err(SshToolError::ShellTimeout(limit));
            }
        };

        self.state = next;
        info!(addr = %session.addr, "shell channel open");
        Ok(ShellChannel::new(channel.into_stream(), options.pty))
    }

    /// Tear down the session. A no-op when already disconnected.
    pub async fn disconnect(&mut self) {
        let Some(session) = self.session.take() else {
            debug!("disconnect requested with no active session");
            return;
        };

        let request = session
            .handle
            .disconnect(Disconnect::ByApplication, "", "en");

        match timeout(DISCONNECT_TIMEOUT, request).await {
            Ok(Ok(())) => info!(addr = %session.addr, "disconnected"),
            Ok(Err(e)) => warn!(addr = %session.addr, error = %e, "disconnect failed"),
            Err(_) => warn!(addr = %session.addr, "disconnect timed out, dropping session"),
        }

        self.state = ConnectionState::Disconnected;
    }
}

async fn establish(params: &ConnectParams) -> Result<Session> {
    let mut config = client::Config::default();
    config.inactivity_timeout = None;
    config.keepalive_interval = params.keepalive_interval;

    let verifier = HostKeyVerifier::new(params.host_key.clone());
    let presented = verifier.presented();
    let addr = params.addr();

    let mut handle = client::connect(
        Arc::new(config),
        (params.host.as_str(), params.port),
        verifier,
    )
    .await
    .map_err(|e| classify_connect_error(e, &addr, &presented))?;

    debug!(%addr, user = %params.username, "authenticating with password");
    let auth = handle
        .authenticate_password(params.username.clone(), params.password.clone())
        .await?;

    if !auth.success() {
        warn!(%addr, user = %params.username, "password authentication rejected");
        return Err(SshToolError::AuthRejected {
            user: params.username.clone(),
        });
    }

    Ok(Session {
        handle,
        addr,
        username: params.username.clone(),
    })
}

async fn request_shell(
    handle: &Handle<HostKeyVerifier>,
    options: &ShellOptions,
) -> Result<russh::Channel<client::Msg>> {
    let channel = handle
        .channel_open_session()
        .await
        .map_err(|e| SshToolError::ShellOpen(format!("channel open failed: {e}")))?;

    if options.pty {
        channel
            .request_pty(true, &options.term, options.cols, options.rows, 0, 0, &[])
            .await
            .map_err(|e| SshToolError::ShellOpen(format!("PTY request failed: {e}")))?;
    }

    channel
        .request_shell(true)
        .await
        .map_err(|e| SshToolError::ShellOpen(format!("shell request failed: {e}")))?;

    Ok(channel)
}

fn classify_connect_error(
    err: russh::Error,
    addr: &str,
    presented: &Mutex<Option<String>>,
) -> SshToolError {
    match err {
        russh::Error::UnknownKey => SshToolError::HostKeyRejected {
            fingerprint: presented
                .lock()
                .ok()
                .and_then(|slot| slot.clone())
                .unwrap_or_else(|| "<unknown>".to_string()),
        },
        other => SshToolError::Connect {
            addr: addr.to_string(),
            reason: other.to_string(),
        },
    }
}
