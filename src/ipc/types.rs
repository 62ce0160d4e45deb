use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::auth::AdminGate;
use crate::config::Config;
use crate::countdown::CountdownTicker;
use crate::data_store::{DataStore, ResultsStore};
use crate::error::StoreResult;
use crate::store::SqliteStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub config: Config,
    pub gate: AdminGate,
    pub workspace: Option<PathBuf>,
    pub data: Option<Box<dyn ResultsStore>>,
    /// Set by a successful `session.login`.
    pub admin: bool,
    pub ticker: Option<CountdownTicker>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let gate = AdminGate::new(config.admin_passphrase_sha256.clone());
        Self {
            config,
            gate,
            workspace: None,
            data: None,
            admin: false,
            ticker: None,
        }
    }

    /// Swap in the data store for `path`. On failure the previous workspace
    /// stays open.
    pub fn open_workspace(&mut self, path: &Path) -> StoreResult<usize> {
        let data = DataStore::open(SqliteStore::open(path)?)?;
        let count = data.students().len();
        self.stop_ticker();
        self.workspace = Some(path.to_path_buf());
        self.data = Some(Box::new(data));
        info!(workspace = %path.display(), students = count, "workspace opened");
        Ok(count)
    }

    /// Returns whether a ticker was running.
    pub fn stop_ticker(&mut self) -> bool {
        match self.ticker.take() {
            Some(ticker) => {
                ticker.dispose();
                true
            }
            None => false,
        }
    }
}
