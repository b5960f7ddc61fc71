//! Fuelplan Dashboard Server module
//!
//! Provides the HTTP dashboard and JSON API over the latest load.
//! Run with `fuelplan serve` or `fuelplan-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server, ApiConfig, AppState};
