//! CLI command handlers

pub mod commands;
pub mod options;

pub use commands::{export, load, snapshot};
pub use options::ConfigArgs;
