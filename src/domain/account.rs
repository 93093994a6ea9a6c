use std::fmt;

use serde::{Deserialize, Serialize};

use super::{fresh_id, now_timestamp};

/// A registered account as persisted in the accounts collection.
///
/// The stored credential is compared verbatim at sign-in; hashing is out of
/// scope for a single-machine local store.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub username: String,
    pub password: String,
    /// Empty when no picture is set; otherwise a URL or a data URL.
    #[serde(default)]
    pub profile_picture: String,
    pub created_at: String,
}

impl Account {
    /// Creates a fresh account with a newly allocated, immutable id.
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            id: fresh_id("user"),
            username: username.to_owned(),
            password: password.to_owned(),
            profile_picture: String::new(),
            created_at: now_timestamp(),
        }
    }

    /// The public subset of the account exposed as the active session.
    pub fn session_view(&self) -> SessionUser {
        SessionUser {
            id: self.id.clone(),
            username: self.username.clone(),
            profile_picture: self.profile_picture.clone(),
        }
    }
}

// Manual impl keeps the raw credential out of logs and panic payloads.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("profile_picture", &self.profile_picture)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// The public view of a signed-in account held by the running process, and
/// the shape under which peers are listed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub profile_picture: String,
}
