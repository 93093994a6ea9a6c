use serde::{Deserialize, Serialize};

use super::{fresh_id, now_timestamp};

/// Placeholder written over the content of a fully deleted message. The
/// view filter matches on this exact literal, so the delete write path and
/// the read path must share it.
pub const DELETED_MESSAGE_PLACEHOLDER: &str = "This message was deleted.";

/// A single chat message as persisted in a conversation's message list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    /// RFC 3339; refreshed when the message is edited.
    pub timestamp: String,
    /// Absent in records written before their first edit.
    #[serde(default)]
    pub edited: bool,
    #[serde(default)]
    pub deleted_by_sender: bool,
    #[serde(default)]
    pub deleted_by_receiver: bool,
}

impl Message {
    /// Builds a freshly sent message: unedited, with both deletion flags
    /// clear. Sender and receiver must be distinct accounts.
    pub fn outgoing(sender_id: &str, receiver_id: &str, content: &str) -> Self {
        debug_assert_ne!(sender_id, receiver_id, "a message needs two distinct parties");

        Self {
            id: fresh_id("msg"),
            sender_id: sender_id.to_owned(),
            receiver_id: receiver_id.to_owned(),
            content: content.to_owned(),
            timestamp: now_timestamp(),
            edited: false,
            deleted_by_sender: false,
            deleted_by_receiver: false,
        }
    }

    /// Structural check for "hidden from every view": both parties deleted
    /// the message and its content is the placeholder. Not a permission
    /// check; neither side ever sees a tombstoned record.
    pub fn is_tombstoned(&self) -> bool {
        self.deleted_by_sender
            && self.deleted_by_receiver
            && self.content == DELETED_MESSAGE_PLACEHOLDER
    }
}
