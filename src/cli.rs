//! Command-line interface for sshtool.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments.
///
/// Everything is optional so that unset flags fall through to the
/// environment, the config file and finally the defaults.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Remote host.
    pub host: Option<String>,
    /// Remote port.
    pub port: Option<u16>,
    /// Login user.
    pub user: Option<String>,
    /// Login password.
    pub password: Option<String>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Log level or filter directive.
    pub log_level: Option<String>,
    /// Skip host key verification.
    pub accept_any_host_key: bool,
    /// Trusted host key fingerprints.
    pub host_keys: Vec<String>,
    /// PTY terminal type.
    pub term: Option<String>,
    /// Do not request a PTY.
    pub no_pty: bool,
    /// Strip ANSI escapes from displayed output.
    pub strip_ansi: bool,
    /// Do not probe for an active network transport.
    pub skip_network_check: bool,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut destination: Option<String> = None;
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('H') | Long("host") => {
                let value: String = parser.value()?.parse()?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidValue("host", value));
                }
                result.host = Some(value);
            }
            Short('p') | Long("port") => {
                let value: String = parser.value()?.parse()?;
                let port: u16 = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidValue("port", value.clone()))?;
                if port == 0 {
                    return Err(ArgsError::InvalidValue("port", value));
                }
                result.port = Some(port);
            }
            Short('u') | Long("user") => {
                result.user = Some(parser.value()?.parse()?);
            }
            Long("password") => {
                result.password = Some(parser.value()?.parse()?);
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Long("accept-any-host-key") => {
                result.accept_any_host_key = true;
            }
            Long("host-key") => {
                result.host_keys.push(parser.value()?.parse()?);
            }
            Long("term") => {
                result.term = Some(parser.value()?.parse()?);
            }
            Long("no-pty") => {
                result.no_pty = true;
            }
            Long("strip-ansi") => {
                result.strip_ansi = true;
            }
            Long("skip-network-check") => {
                result.skip_network_check = true;
            }
            Value(val) if destination.is_none() => {
                destination = Some(val.string()?);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    if let Some(dest) = destination {
        let (user, host) = parse_destination(&dest)?;
        if result.host.is_none() {
            result.host = Some(host);
        }
        if result.user.is_none() {
            result.user = user;
        }
    }

    Ok(result)
}

/// Split `[user@]host` into its parts.
pub fn parse_destination(dest: &str) -> Result<(Option<String>, String), ArgsError> {
    let (user, host) = match dest.rsplit_once('@') {
        Some((user, host)) => (Some(user), host),
        None => (None, dest),
    };

    if host.trim().is_empty() {
        return Err(ArgsError::InvalidValue("destination", dest.to_string()));
    }
    if user.is_some_and(|u| u.trim().is_empty()) {
        return Err(ArgsError::InvalidValue("destination", dest.to_string()));
    }

    Ok((user.map(str::to_string), host.to_string()))
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"sshtool {version}
Open an interactive SSH shell and relay it line by line

USAGE:
    sshtool [OPTIONS] [[USER@]HOST]

OPTIONS:
    -H, --host <HOST>           Remote host
    -p, --port <PORT>           Remote port [default: 22]
    -u, --user <USER>           Login user
        --password <PASS>       Login password (prefer SSHTOOL_PASSWORD)
    -c, --config <FILE>         Path to configuration file (JSON)
    -l, --log-level <LVL>       Log level (error, warn, info, debug, trace)
        --host-key <FP>         Trust this SHA256 host key fingerprint (repeatable)
        --accept-any-host-key   Disable host key verification (insecure)
        --term <TYPE>           PTY terminal type [default: xterm]
        --no-pty                Do not request a PTY
        --strip-ansi            Strip terminal escape sequences from output
        --skip-network-check    Connect without probing for a network transport
    -h, --help                  Print help
    -V, --version               Print version

ENVIRONMENT VARIABLES:
    SSHTOOL_HOST                Remote host (overrides config)
    SSHTOOL_PORT                Remote port (overrides config)
    SSHTOOL_USER                Login user (overrides config)
    SSHTOOL_PASSWORD            Login password (overrides config)
    SSHTOOL_LOG_LEVEL           Log level (overrides config)
    RUST_LOG                    Alternative log level setting

Each line read from stdin is sent to the remote shell followed by a
newline. Output is written to stdout, notices and logs to stderr.

EXAMPLES:
    # Pin the server's host key
    sshtool --host-key SHA256:YsuxPqNqMCZOTV6eAKUMiyXIhiNyUkJ6FE1Ik5o0rtw admin@10.0.0.5

    # Lab host, no verification
    SSHTOOL_PASSWORD=secret sshtool --accept-any-host-key -p 2222 pi@raspberrypi.local

    # Start with config file
    sshtool -c ~/.config/sshtool.json
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("sshtool {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for {}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
