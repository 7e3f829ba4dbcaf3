//! Appmixer CLI library
//!
//! Host for the user and account reconcilers: loads a YAML desired state,
//! keeps a JSON state file of reconciled records, and exposes the read-only
//! collection readers. Modules are public for integration testing; the
//! binary lives in `main.rs`.

pub mod commands;
pub mod config;
pub mod desired;
pub mod engine;
pub mod error;
pub mod logging;
pub mod output;
pub mod plan;
pub mod state;
