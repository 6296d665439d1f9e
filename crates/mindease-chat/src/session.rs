//! Session-scoped message store.

use chrono::NaiveDateTime;

use crate::types::{Message, MessageId};

/// Append-only message list for one conversation.
///
/// Ids start at 0 (the greeting) and increase by one per message; they are
/// never reused, even across [`MessageStore::restart`].
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    next_id: u64,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn append(
        &mut self,
        text: String,
        is_user: bool,
        timestamp: NaiveDateTime,
        companion_id: Option<String>,
    ) -> &Message {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(Message {
            id,
            text,
            is_user,
            timestamp,
            companion_id,
        });
        &self.messages[self.messages.len() - 1]
    }

    pub fn push_user(&mut self, text: impl Into<String>, at: NaiveDateTime) -> &Message {
        self.append(text.into(), true, at, None)
    }

    pub fn push_reply(
        &mut self,
        text: impl Into<String>,
        at: NaiveDateTime,
        companion_id: Option<String>,
    ) -> &Message {
        self.append(text.into(), false, at, companion_id)
    }

    /// Drop the conversation and open a new one with `greeting`.
    ///
    /// Used when the user switches companion or opens the chat from a
    /// calendar entry.
    pub fn restart(
        &mut self,
        greeting: impl Into<String>,
        at: NaiveDateTime,
        companion_id: Option<String>,
    ) -> &Message {
        self.messages.clear();
        self.push_reply(greeting, at, companion_id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, 7)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = MessageStore::new();
        assert!(store.is_empty());
        assert!(store.last().is_none());
    }

    #[test]
    fn test_same_tick_messages_get_distinct_ids() {
        let mut store = MessageStore::new();
        let a = store.push_user("hi", t0()).id;
        let b = store.push_reply("hello", t0(), None).id;
        assert_ne!(a, b);
        assert!(a < b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut store = MessageStore::new();
        store.push_reply("greeting", t0(), None);
        store.push_user("one", t0());
        store.push_reply("two", t0(), None);
        let texts: Vec<&str> = store.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["greeting", "one", "two"]);
        assert_eq!(store.messages()[0].id, MessageId(0));
        assert!(store.messages()[1].is_user);
        assert!(!store.last().unwrap().is_user);
    }

    #[test]
    fn test_restart_clears_but_keeps_counting() {
        let mut store = MessageStore::new();
        store.push_user("one", t0());
        store.push_reply("two", t0(), None);
        let greeting_id = store.restart("fresh", t0(), Some("2".to_string())).id;
        assert_eq!(store.len(), 1);
        assert_eq!(greeting_id, MessageId(2));
        assert_eq!(store.last().unwrap().companion_id.as_deref(), Some("2"));
    }
}
