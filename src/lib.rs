//! Graduation-results data store for a single school.
//!
//! Admins manage student records and site settings; visitors look up their
//! own result by NISN once results are published. State persists in a SQLite
//! key/value table inside a workspace directory.

pub mod auth;
pub mod backup;
pub mod config;
pub mod countdown;
pub mod data_store;
pub mod db;
pub mod error;
pub mod ipc;
pub mod registry;
pub mod search;
pub mod settings;
pub mod spreadsheet;
pub mod store;
