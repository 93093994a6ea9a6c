//! Persistence and lifecycle for one conversation's message list.
//!
//! Every operation re-reads the full persisted list, transforms it, writes
//! the whole list back, and returns the updated list. The view is a
//! projection over the stored list; there is no cache to invalidate.

use crate::{
    domain::{
        conversation::ConversationKey,
        message::{Message, DELETED_MESSAGE_PLACEHOLDER},
        now_timestamp,
    },
    infra::kv::{self, KeyValueStore},
};

/// Appends `message` to the end of the conversation and writes through.
pub fn append(
    store: &mut dyn KeyValueStore,
    key: &ConversationKey,
    message: Message,
) -> Vec<Message> {
    let mut messages = stored(store, key);
    messages.push(message);
    write_back(store, key, &messages);
    messages
}

/// Replaces the content of the matching message, marks it edited, and
/// refreshes its timestamp. Deletion flags are untouched. Absent ids and
/// whitespace-only content leave the stored list untouched. Ids are unique
/// by construction; should duplicates ever appear, every match is updated.
pub fn edit(
    store: &mut dyn KeyValueStore,
    key: &ConversationKey,
    message_id: &str,
    new_content: &str,
) -> Vec<Message> {
    let mut messages = stored(store, key);
    if new_content.trim().is_empty() || !messages.iter().any(|message| message.id == message_id) {
        return messages;
    }

    for message in messages.iter_mut().filter(|message| message.id == message_id) {
        message.content = new_content.to_owned();
        message.edited = true;
        message.timestamp = now_timestamp();
    }
    write_back(store, key, &messages);
    messages
}

/// Deletes the matching message for both parties at once: both deletion
/// flags are set and the content is replaced with the placeholder,
/// regardless of which party asked. Absent ids leave the stored list
/// untouched.
pub fn soft_delete(
    store: &mut dyn KeyValueStore,
    key: &ConversationKey,
    message_id: &str,
) -> Vec<Message> {
    let mut messages = stored(store, key);
    if !messages.iter().any(|message| message.id == message_id) {
        return messages;
    }

    for message in messages.iter_mut().filter(|message| message.id == message_id) {
        message.deleted_by_sender = true;
        message.deleted_by_receiver = true;
        message.content = DELETED_MESSAGE_PLACEHOLDER.to_owned();
    }
    write_back(store, key, &messages);
    messages
}

/// The renderable projection: storage order, tombstoned records excluded.
/// Both participants of the conversation see the same sequence.
pub fn view(store: &dyn KeyValueStore, key: &ConversationKey) -> Vec<Message> {
    stored(store, key)
        .into_iter()
        .filter(|message| !message.is_tombstoned())
        .collect()
}

/// The raw persisted list, tombstones included.
pub fn stored(store: &dyn KeyValueStore, key: &ConversationKey) -> Vec<Message> {
    kv::get_typed(store, &key.storage_key()).unwrap_or_default()
}

fn write_back(store: &mut dyn KeyValueStore, key: &ConversationKey, messages: &[Message]) {
    kv::set_typed(store, &key.storage_key(), &messages);
}
