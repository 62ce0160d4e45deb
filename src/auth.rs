//! Admin passphrase gate.
//!
//! Only the hex SHA-256 digest of the passphrase is configured. Digests are
//! compared in constant time.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AdminGate {
    expected_sha256: Option<String>,
}

impl AdminGate {
    /// `None` (or a blank digest) leaves the gate open: every login succeeds.
    pub fn new(expected_sha256: Option<String>) -> Self {
        let expected_sha256 = expected_sha256
            .map(|h| h.trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty());
        if expected_sha256.is_none() {
            warn!("no admin passphrase digest configured (PLUITPASS_ADMIN_PASSPHRASE_SHA256), admin gate is open");
        }
        Self { expected_sha256 }
    }

    pub fn is_open(&self) -> bool {
        self.expected_sha256.is_none()
    }

    pub fn verify(&self, passphrase: &str) -> bool {
        let Some(expected) = &self.expected_sha256 else {
            return true;
        };
        let actual = passphrase_sha256(passphrase);
        actual.as_bytes().ct_eq(expected.as_bytes()).into()
    }
}

pub fn passphrase_sha256(passphrase: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(passphrase.as_bytes());
    format!("{:x}", hasher.finalize())
}
