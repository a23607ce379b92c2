//! Configuration management for sshtool.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::relay::{RelayOptions, DEFAULT_READ_BUFFER};
use crate::ssh::{ConnectParams, HostKeyPolicy, ShellOptions, DEFAULT_PORT, DEFAULT_TERM};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where and as whom to connect.
    pub connection: ConnectionSection,
    /// Host key verification.
    pub host_key: HostKeySection,
    /// Shell channel settings.
    pub shell: ShellSection,
    /// Output display settings.
    pub display: DisplaySection,
    /// Network availability check.
    pub network: NetworkSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Connection configuration section.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSection {
    /// Remote host.
    pub host: String,
    /// Remote port.
    pub port: u16,
    /// Login user.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Connect + handshake + auth timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// SSH keepalive interval in seconds.
    pub keepalive_secs: Option<u64>,
}

impl Default for ConnectionSection {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            username: "root".to_string(),
            password: String::new(),
            connect_timeout_ms: 10_000,
            keepalive_secs: None,
        }
    }
}

impl std::fmt::Debug for ConnectionSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSection")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("keepalive_secs", &self.keepalive_secs)
            .finish()
    }
}

/// Host key configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostKeySection {
    /// Accept any host key. Insecure; off unless set explicitly.
    pub accept_any: bool,
    /// Trusted SHA256 fingerprints.
    pub fingerprints: Vec<String>,
}

/// Shell configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSection {
    /// Request a PTY.
    pub pty: bool,
    /// PTY terminal type.
    pub term: String,
    /// PTY width.
    pub cols: u32,
    /// PTY height.
    pub rows: u32,
    /// Shell open timeout in milliseconds.
    pub open_timeout_ms: u64,
    /// Read buffer size in bytes.
    pub read_buffer_size: usize,
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            pty: true,
            term: DEFAULT_TERM.to_string(),
            cols: 80,
            rows: 24,
            open_timeout_ms: 3_000,
            read_buffer_size: DEFAULT_READ_BUFFER,
        }
    }
}

/// Display configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// Strip terminal escape sequences before display.
    pub strip_ansi: bool,
}

/// Network check configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSection {
    /// Probe for an active transport before connecting.
    pub check: bool,
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self { check: true }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace) or filter directive.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SSHTOOL_HOST") {
            self.connection.host = host;
        }

        if let Some(port) = lookup("SSHTOOL_PORT") {
            if let Ok(port) = port.parse() {
                self.connection.port = port;
            }
        }

        if let Some(user) = lookup("SSHTOOL_USER") {
            self.connection.username = user;
        }

        if let Some(password) = lookup("SSHTOOL_PASSWORD") {
            self.connection.password = password;
        }

        if let Some(level) = lookup("SSHTOOL_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Some(level) = lookup("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref host) = args.host {
            self.connection.host = host.clone();
        }
        if let Some(port) = args.port {
            self.connection.port = port;
        }
        if let Some(ref user) = args.user {
            self.connection.username = user.clone();
        }
        if let Some(ref password) = args.password {
            self.connection.password = password.clone();
        }

        if args.accept_any_host_key {
            self.host_key.accept_any = true;
        }
        for fingerprint in &args.host_keys {
            if !self.host_key.fingerprints.contains(fingerprint) {
                self.host_key.fingerprints.push(fingerprint.clone());
            }
        }

        if let Some(ref term) = args.term {
            self.shell.term = term.clone();
        }
        if args.no_pty {
            self.shell.pty = false;
        }
        if args.strip_ansi {
            self.display.strip_ansi = true;
        }
        if args.skip_network_check {
            self.network.check = false;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Host key policy described by this configuration.
    pub fn host_key_policy(&self) -> HostKeyPolicy {
        if self.host_key.accept_any {
            HostKeyPolicy::AcceptAny
        } else {
            HostKeyPolicy::pinned(self.host_key.fingerprints.iter().cloned())
        }
    }

    /// Convert to connection parameters.
    pub fn to_connect_params(&self) -> Result<ConnectParams, ConfigError> {
        let conn = &self.connection;
        if conn.host.trim().is_empty() {
            return Err(ConfigError::Invalid("connection.host is empty".into()));
        }
        if conn.username.trim().is_empty() {
            return Err(ConfigError::Invalid("connection.username is empty".into()));
        }
        if conn.port == 0 {
            return Err(ConfigError::Invalid("connection.port must be non-zero".into()));
        }
        if conn.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "connection.connect_timeout_ms must be non-zero".into(),
            ));
        }

        let mut params = ConnectParams::new(&conn.host, &conn.username, &conn.password)
            .with_port(conn.port)
            .with_connect_timeout(Duration::from_millis(conn.connect_timeout_ms))
            .with_host_key(self.host_key_policy());
        params.keepalive_interval = conn.keepalive_secs.map(Duration::from_secs);

        Ok(params)
    }

    /// Convert to shell channel options.
    pub fn shell_options(&self) -> ShellOptions {
        ShellOptions {
            pty: self.shell.pty,
            term: self.shell.term.clone(),
            cols: self.shell.cols,
            rows: self.shell.rows,
            open_timeout: Duration::from_millis(self.shell.open_timeout_ms),
        }
    }

    /// Convert to relay options.
    pub fn relay_options(&self) -> RelayOptions {
        RelayOptions {
            read_buffer: self.shell.read_buffer_size.max(1),
            ..RelayOptions::default()
        }
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// A value is out of range or missing.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::Invalid(reason) => write!(f, "invalid configuration: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {}
