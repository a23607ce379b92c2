//! Network transport availability check.
//!
//! A connection is only attempted when some usable transport is up. The
//! controller consumes nothing but the yes/no answer; the transport kind
//! is logged.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Kind of network transport found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Wireless LAN.
    Wifi,
    /// Mobile data.
    Cellular,
    /// Wired ethernet.
    Ethernet,
    /// Not probed; assumed available.
    Assumed,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transport::Wifi => "wifi",
            Transport::Cellular => "cellular",
            Transport::Ethernet => "ethernet",
            Transport::Assumed => "assumed",
        };
        f.write_str(name)
    }
}

/// Answers whether a usable network transport is active.
pub trait NetworkProbe: Send + Sync {
    /// The active transport, or `None` when there is none.
    fn active_transport(&self) -> Option<Transport>;

    /// Whether any transport is active.
    fn is_online(&self) -> bool {
        self.active_transport().is_some()
    }
}

/// A probe with a fixed answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedProbe(Option<Transport>);

impl FixedProbe {
    /// A probe reporting the given transport.
    pub fn new(transport: Option<Transport>) -> Self {
        Self(transport)
    }

    /// A probe that never checks and always answers yes.
    pub fn assumed() -> Self {
        Self(Some(Transport::Assumed))
    }

    /// A probe that always answers no.
    pub fn offline() -> Self {
        Self(None)
    }
}

impl NetworkProbe for FixedProbe {
    fn active_transport(&self) -> Option<Transport> {
        self.0
    }
}

const ARPHRD_ETHER: &str = "1";

/// Probes interfaces under `/sys/class/net`.
///
/// An interface counts when its `operstate` is `up` and it is not the
/// loopback device. WiFi wins over cellular, cellular over ethernet.
#[derive(Debug, Clone)]
pub struct SysfsProbe {
    root: PathBuf,
}

impl Default for SysfsProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SysfsProbe {
    /// Probe the live system.
    pub fn new() -> Self {
        Self::with_root("/sys/class/net")
    }

    /// Probe an alternate sysfs-style tree.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn classify(&self, dir: &Path, name: &str) -> Option<Transport> {
        if name == "lo" || read_trimmed(&dir.join("operstate")).as_deref() != Some("up") {
            return None;
        }

        if dir.join("wireless").is_dir() || name.starts_with("wl") {
            return Some(Transport::Wifi);
        }
        if name.starts_with("ww") || name.starts_with("rmnet") {
            return Some(Transport::Cellular);
        }
        if read_trimmed(&dir.join("type")).as_deref() == Some(ARPHRD_ETHER) {
            return Some(Transport::Ethernet);
        }
        None
    }
}

impl NetworkProbe for SysfsProbe {
    fn active_transport(&self) -> Option<Transport> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(root = %self.root.display(), error = %e, "cannot list network interfaces");
                return None;
            }
        };

        let mut found: Vec<Transport> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                self.classify(&entry.path(), &name)
            })
            .collect();

        found.sort_by_key(|t| match t {
            Transport::Wifi => 0,
            Transport::Cellular => 1,
            Transport::Ethernet => 2,
            Transport::Assumed => 3,
        });

        match found.first() {
            Some(transport) => {
                debug!(%transport, "network transport active");
                Some(*transport)
            }
            None => {
                debug!("no network transport active");
                None
            }
        }
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

/// The probe appropriate for this platform.
///
/// Linux reads sysfs; elsewhere the check is skipped.
pub fn default_probe() -> Box<dyn NetworkProbe> {
    #[cfg(target_os = "linux")]
    {
        Box::new(SysfsProbe::new())
    }
    #[cfg(not(target_os = "linux"))]
    {
        Box::new(FixedProbe::assumed())
    }
}

impl<P: NetworkProbe + ?Sized> NetworkProbe for Box<P> {
    fn active_transport(&self) -> Option<Transport> {
        (**self).active_transport()
    }
}
