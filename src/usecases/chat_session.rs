//! Orchestrates one signed-in user's chat shell: peer selection, the
//! single-slot edit buffer, and delegation to the message log.

use crate::{
    domain::{account::SessionUser, conversation::ConversationKey, message::Message},
    infra::kv::KeyValueStore,
    store::message_log,
};

/// A signed-in user's handle on the chat layer. Constructing one requires
/// an authenticated session view, so every operation below already has a
/// sender identity.
#[derive(Debug)]
pub struct ChatSession {
    me: SessionUser,
    peer: Option<SessionUser>,
    key: Option<ConversationKey>,
    /// Id of the message currently being edited, if any. One slot only.
    editing: Option<String>,
}

impl ChatSession {
    pub fn new(me: SessionUser) -> Self {
        Self {
            me,
            peer: None,
            key: None,
            editing: None,
        }
    }

    pub fn me(&self) -> &SessionUser {
        &self.me
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn peer(&self) -> Option<&SessionUser> {
        self.peer.as_ref()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Opens the conversation with `peer`, discarding any in-progress edit.
    /// Returns false (and changes nothing) for a self-conversation.
    pub fn select_peer(&mut self, peer: SessionUser) -> bool {
        if peer.id == self.me.id {
            return false;
        }

        self.editing = None;
        self.key = Some(ConversationKey::for_pair(&self.me.id, &peer.id));
        self.peer = Some(peer);
        true
    }

    /// The renderable message sequence for the open conversation; empty
    /// when none is selected.
    pub fn messages(&self, store: &dyn KeyValueStore) -> Vec<Message> {
        match &self.key {
            Some(key) => message_log::view(store, key),
            None => Vec::new(),
        }
    }

    /// Sends `text` to the selected peer. `None` (no-op) when the text is
    /// blank or no conversation is open. The content is stored as typed.
    pub fn send(&mut self, store: &mut dyn KeyValueStore, text: &str) -> Option<Vec<Message>> {
        if text.trim().is_empty() {
            return None;
        }
        let peer = self.peer.as_ref()?;
        let key = self.key.as_ref()?;

        let message = Message::outgoing(&self.me.id, &peer.id, text);
        Some(message_log::append(store, key, message))
    }

    /// Puts one of the user's own visible messages into the edit slot.
    /// Messages authored by the peer, deleted messages, and unknown ids are
    /// rejected.
    pub fn request_edit(&mut self, store: &dyn KeyValueStore, message_id: &str) -> bool {
        let Some(key) = &self.key else {
            return false;
        };

        let editable = message_log::view(store, key)
            .iter()
            .any(|message| message.id == message_id && message.sender_id == self.me.id);
        if editable {
            self.editing = Some(message_id.to_owned());
        }
        editable
    }

    /// Drops the edit slot without touching the store.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Applies `new_text` to the slotted message and clears the slot.
    /// `None` when no edit is in progress. Blank text clears the slot but
    /// leaves the message unchanged.
    pub fn save_edit(&mut self, store: &mut dyn KeyValueStore, new_text: &str) -> Option<Vec<Message>> {
        let key = self.key.clone()?;
        let message_id = self.editing.take()?;
        Some(message_log::edit(store, &key, &message_id, new_text))
    }

    /// Deletes a message for both parties. `None` when no conversation is
    /// open; unknown ids fall through to the log's no-op.
    pub fn delete_message(
        &mut self,
        store: &mut dyn KeyValueStore,
        message_id: &str,
    ) -> Option<Vec<Message>> {
        let key = self.key.as_ref()?;
        Some(message_log::soft_delete(store, key, message_id))
    }
}
