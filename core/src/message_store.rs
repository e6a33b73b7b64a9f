/// Message list for the active conversation — in-memory, arrival order.
/// List position reflects merge order, not timestamps; only the initial
/// history load arrives pre-sorted from the server.
use crate::chat_types::Message;

#[derive(Debug, Default)]
pub struct MessageStore {
    items: Vec<Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Wholesale replace from the initial history fetch
    pub fn replace_all(&mut self, messages: Vec<Message>) {
        self.items = messages;
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// True if a confirmed (non-optimistic) entry with this id exists
    pub fn contains_confirmed(&self, id: &str) -> bool {
        self.items.iter().any(|m| !m.is_optimistic && m.id == id)
    }

    pub fn append(&mut self, message: Message) {
        self.items.push(message);
    }

    /// Replace the earliest pending optimistic entry matching sender and
    /// text with the authoritative message, preserving list position.
    /// Returns false if no placeholder matched.
    pub fn confirm_optimistic(&mut self, authoritative: &Message) -> bool {
        let slot = self.items.iter().position(|m| {
            m.is_optimistic && m.sender_id == authoritative.sender_id && m.text == authoritative.text
        });
        match slot {
            Some(i) => {
                let mut confirmed = authoritative.clone();
                confirmed.is_optimistic = false;
                self.items[i] = confirmed;
                true
            }
            None => false,
        }
    }

    /// Mark every entry read (read-receipt for the whole conversation)
    pub fn mark_all_read(&mut self) {
        for m in &mut self.items {
            m.is_read = true;
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
