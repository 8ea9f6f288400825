//! # wfa-server
//!
//! HTTP API (C6 trigger ingress + read endpoints) and worker loop (C7) for
//! the workflow-automation service. Three binaries share this library:
//! `wfa-api` serves the REST surface in spec.md §6, `wfa-worker` runs the
//! Kafka consumer loop described in spec.md §4.7, and `wfa-loadtest` drives
//! both against a running deployment.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod worker;

pub use config::Config;
pub use state::AppState;
