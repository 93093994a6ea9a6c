//! Deterministic addressing for two-party conversations.

/// Order-independent identifier for the message list shared by exactly two
/// accounts. All messages between a pair live under this single key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey(String);

impl ConversationKey {
    /// Derives the canonical key for a pair of account ids: the ids sorted
    /// lexicographically and joined with `_`, so `for_pair(a, b)` and
    /// `for_pair(b, a)` address the same conversation. Callers must not
    /// pass the same id twice.
    pub fn for_pair(id_a: &str, id_b: &str) -> Self {
        debug_assert_ne!(id_a, id_b, "a conversation needs two distinct accounts");

        let (first, second) = if id_a <= id_b {
            (id_a, id_b)
        } else {
            (id_b, id_a)
        };
        Self(format!("{first}_{second}"))
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The store key holding this conversation's message list.
    pub fn storage_key(&self) -> String {
        format!("chat_{}", self.0)
    }
}
