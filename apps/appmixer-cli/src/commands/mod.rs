//! CLI command implementations

pub mod accounts;
pub mod apply;
pub mod apps;
pub mod import;
pub mod users;
pub mod whoami;
