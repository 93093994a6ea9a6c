//! Data layer: the account/session registry and per-conversation message
//! logs, all backed by the key-value primitive.

pub mod message_log;
pub mod session;

/// Returns the store module name for smoke checks.
pub fn module_name() -> &'static str {
    "store"
}
