//! Error kinds shared by the store, codecs and the IPC layer.

use std::fmt;

/// Stable error codes surfaced in IPC responses.
pub mod codes {
    pub const BAD_JSON: &str = "bad_json";
    pub const BAD_PARAMS: &str = "bad_params";
    pub const NO_WORKSPACE: &str = "no_workspace";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const NOT_FOUND: &str = "not_found";
    pub const PARSE_FAILED: &str = "parse_failed";
    pub const UNSUPPORTED_VERSION: &str = "unsupported_version";
    pub const STORAGE_FAILED: &str = "storage_failed";
    pub const IO_FAILED: &str = "io_failed";
    pub const NOT_IMPLEMENTED: &str = "not_implemented";
}

#[derive(Debug)]
pub enum StoreError {
    /// Malformed backup, spreadsheet or persisted text.
    ParseFailure(String),
    /// Backup written by a newer schema than this build understands.
    UnsupportedVersion(u64),
    /// The key/value backend failed.
    Storage(String),
    Io(std::io::Error),
    /// Workbook could not be written.
    Spreadsheet(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::ParseFailure(_) => codes::PARSE_FAILED,
            StoreError::UnsupportedVersion(_) => codes::UNSUPPORTED_VERSION,
            StoreError::Storage(_) => codes::STORAGE_FAILED,
            StoreError::Io(_) => codes::IO_FAILED,
            StoreError::Spreadsheet(_) => codes::IO_FAILED,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::ParseFailure(msg) => write!(f, "parse failure: {}", msg),
            StoreError::UnsupportedVersion(v) => {
                write!(f, "unsupported backup schema version: {}", v)
            }
            StoreError::Storage(msg) => write!(f, "storage error: {}", msg),
            StoreError::Io(e) => write!(f, "io error: {}", e),
            StoreError::Spreadsheet(msg) => write!(f, "spreadsheet error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        tracing::error!("sqlite error: {:?}", err);
        StoreError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::ParseFailure(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<calamine::Error> for StoreError {
    fn from(err: calamine::Error) -> Self {
        StoreError::ParseFailure(format!("invalid workbook: {}", err))
    }
}

impl From<rust_xlsxwriter::XlsxError> for StoreError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        tracing::error!("xlsx write error: {:?}", err);
        StoreError::Spreadsheet(err.to_string())
    }
}
