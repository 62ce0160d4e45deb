//! Sidecar configuration, read from the environment (and `.env` if present).

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace opened at startup, if any.
    pub workspace: Option<PathBuf>,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Hex SHA-256 of the admin passphrase.
    pub admin_passphrase_sha256: Option<String>,
    /// Where backups and workbooks land when a request names no path.
    pub export_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let workspace = env::var("PLUITPASS_WORKSPACE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let log_level = env::var("PLUITPASS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let admin_passphrase_sha256 = env::var("PLUITPASS_ADMIN_PASSPHRASE_SHA256").ok();

        let export_dir = env::var("PLUITPASS_EXPORT_DIR")
            .unwrap_or_else(|_| ".".to_string())
            .into();

        Self {
            workspace,
            log_level,
            admin_passphrase_sha256,
            export_dir,
        }
    }
}
