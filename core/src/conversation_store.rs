/// Conversation list — in-memory, ordered by recency.
/// The server owns persistence; this is the client-side view the
/// reconciler keeps consistent.
use crate::chat_types::Conversation;
use chrono::{DateTime, Utc};

#[derive(Debug, Default)]
pub struct ConversationStore {
    items: Vec<Conversation>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Wholesale replace from a REST fetch, re-sorted by recency
    pub fn replace_all(&mut self, conversations: Vec<Conversation>) {
        self.items = conversations;
        self.sort_by_recency();
    }

    /// Insert or update a single conversation (create-or-get result)
    pub fn upsert(&mut self, conversation: Conversation) {
        match self.items.iter_mut().find(|c| c.id == conversation.id) {
            Some(existing) => *existing = conversation,
            None => self.items.push(conversation),
        }
        self.sort_by_recency();
    }

    pub fn get(&self, conversation_id: &str) -> Option<&Conversation> {
        self.items.iter().find(|c| c.id == conversation_id)
    }

    pub fn contains(&self, conversation_id: &str) -> bool {
        self.get(conversation_id).is_some()
    }

    /// Update the denormalized preview fields for one conversation.
    /// Returns false if the conversation is not in the store.
    pub fn apply_preview(
        &mut self,
        conversation_id: &str,
        text: &str,
        at: DateTime<Utc>,
    ) -> bool {
        let Some(c) = self.items.iter_mut().find(|c| c.id == conversation_id) else {
            return false;
        };
        c.last_message_text = text.to_string();
        c.last_message_at = at;
        self.sort_by_recency();
        true
    }

    /// Increment the unread counter for a non-active conversation
    pub fn bump_unread(&mut self, conversation_id: &str) {
        if let Some(c) = self.items.iter_mut().find(|c| c.id == conversation_id) {
            c.unread_count += 1;
        }
    }

    /// Reset the unread counter (conversation became active, or was just read)
    pub fn clear_unread(&mut self, conversation_id: &str) {
        if let Some(c) = self.items.iter_mut().find(|c| c.id == conversation_id) {
            c.unread_count = 0;
        }
    }

    /// Sum of unread counters across all conversations (badge value)
    pub fn total_unread(&self) -> u32 {
        self.items.iter().map(|c| c.unread_count).sum()
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // Stable sort keeps relative order of equal timestamps
    fn sort_by_recency(&mut self) {
        self.items
            .sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
    }
}
