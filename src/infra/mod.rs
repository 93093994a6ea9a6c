//! Infrastructure layer: config, errors, logging, and the persistence
//! primitive.

pub mod config;
pub mod error;
pub mod kv;
pub mod logging;
pub mod storage_layout;

/// Returns the infra module name for smoke checks.
pub fn module_name() -> &'static str {
    "infra"
}
