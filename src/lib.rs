// Library crate for integration tests.
// main.rs has its own mod declarations; this re-exports all modules.

pub mod config;
pub mod error;
pub mod rate_limit;
pub mod roi;
pub mod routes;
pub mod server;
pub mod settings;
pub mod state;
