//! Domain layer: accounts, conversation addressing, and message lifecycle
//! rules.

pub mod account;
pub mod conversation;
pub mod message;

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}

/// Allocates a prefixed unique id (`user_…`, `msg_…`). UUIDv7 ids are
/// time-ordered, which keeps them monotonic-enough for display ordering.
pub fn fresh_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::now_v7())
}

/// Wall-clock timestamp in the persisted format: RFC 3339 with millisecond
/// precision and a trailing `Z`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
