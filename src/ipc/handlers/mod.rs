pub mod backup;
pub mod core;
pub mod dashboard;
pub mod public;
pub mod session;
pub mod settings;
pub mod students;
