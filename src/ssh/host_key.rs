//! Host key verification policy.

use std::sync::{Arc, Mutex};

use russh::client;
use russh::keys::{HashAlg, PublicKey};
use tracing::{debug, warn};

/// Which server host keys a connection will accept.
///
/// The default trusts nothing: the caller must either pin the expected
/// SHA256 fingerprint or explicitly opt in to [`HostKeyPolicy::AcceptAny`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKeyPolicy {
    /// Accept any host key without verification.
    AcceptAny,
    /// Accept only keys whose SHA256 fingerprint is listed.
    Pinned(Vec<String>),
}

impl Default for HostKeyPolicy {
    fn default() -> Self {
        HostKeyPolicy::Pinned(Vec::new())
    }
}

impl HostKeyPolicy {
    /// Build a pinned policy from fingerprints, with or without the
    /// `SHA256:` prefix.
    pub fn pinned<I, S>(fingerprints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        HostKeyPolicy::Pinned(fingerprints.into_iter().map(Into::into).collect())
    }

    /// Check whether a presented fingerprint is trusted.
    pub fn trusts(&self, fingerprint: &str) -> bool {
        match self {
            HostKeyPolicy::AcceptAny => true,
            HostKeyPolicy::Pinned(pinned) => {
                let presented = normalize(fingerprint);
                pinned.iter().any(|fp| normalize(fp) == presented)
            }
        }
    }
}

fn normalize(fingerprint: &str) -> &str {
    let trimmed = fingerprint.trim();
    trimmed.strip_prefix("SHA256:").unwrap_or(trimmed)
}

/// russh client handler that applies a [`HostKeyPolicy`].
///
/// The fingerprint of the last presented key is recorded so a rejection
/// can be reported to the user.
pub struct HostKeyVerifier {
    policy: HostKeyPolicy,
    presented: Arc<Mutex<Option<String>>>,
}

impl HostKeyVerifier {
    /// Create a verifier for the given policy.
    pub fn new(policy: HostKeyPolicy) -> Self {
        Self {
            policy,
            presented: Arc::new(Mutex::new(None)),
        }
    }

    /// Shared slot receiving the fingerprint of the presented key.
    pub fn presented(&self) -> Arc<Mutex<Option<String>>> {
        Arc::clone(&self.presented)
    }
}

impl client::Handler for HostKeyVerifier {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        let fingerprint = server_public_key.fingerprint(HashAlg::Sha256).to_string();
        let algorithm = server_public_key.algorithm().to_string();

        if let Ok(mut slot) = self.presented.lock() {
            *slot = Some(fingerprint.clone());
        }

        match &self.policy {
            HostKeyPolicy::AcceptAny => {
                warn!(%algorithm, %fingerprint, "host key verification disabled; accepting key");
                Ok(true)
            }
            policy if policy.trusts(&fingerprint) => {
                debug!(%algorithm, %fingerprint, "host key matches pinned fingerprint");
                Ok(true)
            }
            _ => {
                warn!(%algorithm, %fingerprint, "host key not trusted; rejecting");
                Ok(false)
            }
        }
    }
}
