/// Merge logic unifying socket, notification, REST, and local-write
/// sources into the conversation and message stores.
///
/// Ingestion is pure and synchronous: no call here performs I/O or
/// fails. When a merge needs data the client does not have (a message
/// for a conversation missing from the store), the caller gets a
/// `SideEffect` back and is responsible for the follow-up fetch.
use crate::active::{ActiveConversation, FetchTicket};
use crate::chat_types::{Conversation, Message, Notification};
use crate::conversation_store::ConversationStore;
use crate::message_store::MessageStore;
use tracing::debug;

/// Where an ingested message came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
    /// Authoritative delivery over the room-scoped channel
    Socket,
    /// Local send awaiting server confirmation
    Optimistic,
}

/// Follow-up work an ingestion call requires from the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// A referenced conversation is not in the store; refetch the list
    RefetchConversations,
}

pub struct Reconciler {
    conversations: ConversationStore,
    messages: MessageStore,
    active: ActiveConversation,
}

impl Reconciler {
    pub fn new() -> Self {
        Self {
            conversations: ConversationStore::new(),
            messages: MessageStore::new(),
            active: ActiveConversation::new(),
        }
    }

    /// Switch the open conversation. Clears the visible message list
    /// (the caller replaces it via `load_history`) and zeroes the
    /// conversation's unread counter.
    pub fn set_active(&mut self, conversation_id: Option<String>) -> FetchTicket {
        self.messages.clear();
        if let Some(id) = &conversation_id {
            self.conversations.clear_unread(id);
        }
        self.active.set(conversation_id)
    }

    pub fn active_conversation(&self) -> Option<&str> {
        self.active.get()
    }

    /// Apply a fetched message history if it belongs to the latest
    /// activation. A stale result (the user switched away while the
    /// fetch was in flight) is discarded.
    pub fn load_history(&mut self, ticket: FetchTicket, messages: Vec<Message>) -> bool {
        if !self.active.accepts(ticket) {
            debug!("Discarding stale history fetch ({} messages)", messages.len());
            return false;
        }
        self.messages.replace_all(messages);
        true
    }

    /// Wholesale conversation-list replace from a REST fetch. The
    /// active conversation's unread counter is re-zeroed afterwards so
    /// a stale server-side count cannot resurface in the open view.
    pub fn replace_conversations(&mut self, conversations: Vec<Conversation>) {
        self.conversations.replace_all(conversations);
        if let Some(id) = self.active.get().map(str::to_string) {
            self.conversations.clear_unread(&id);
        }
    }

    /// Insert or update one conversation (create-or-get result)
    pub fn upsert_conversation(&mut self, conversation: Conversation) {
        let id = conversation.id.clone();
        self.conversations.upsert(conversation);
        if self.active.is_active(&id) {
            self.conversations.clear_unread(&id);
        }
    }

    /// Merge one message into the stores.
    ///
    /// Optimistic sends are appended to the visible list (when their
    /// conversation is open) and update the preview, but never touch
    /// unread counters. Socket deliveries dedup on confirmed id, then
    /// either replace a pending placeholder in place or append, and
    /// bump the unread counter when the conversation is not active.
    pub fn ingest_message(
        &mut self,
        message: Message,
        source: MessageSource,
    ) -> Option<SideEffect> {
        match source {
            MessageSource::Optimistic => {
                if self.active.is_active(&message.conversation_id) {
                    self.messages.append(message.clone());
                }
                if !self.conversations.apply_preview(
                    &message.conversation_id,
                    &message.text,
                    message.created_at,
                ) {
                    debug!(
                        "Optimistic send references unknown conversation {}",
                        message.conversation_id
                    );
                    return Some(SideEffect::RefetchConversations);
                }
                None
            }
            MessageSource::Socket => {
                if self.messages.contains_confirmed(&message.id) {
                    debug!("Duplicate delivery of message {}, ignoring", message.id);
                    return None;
                }

                let is_active = self.active.is_active(&message.conversation_id);
                if is_active && !self.messages.confirm_optimistic(&message) {
                    self.messages.append(message.clone());
                }

                if !self.conversations.apply_preview(
                    &message.conversation_id,
                    &message.text,
                    message.created_at,
                ) {
                    debug!(
                        "Message for unknown conversation {}, refetching list",
                        message.conversation_id
                    );
                    return Some(SideEffect::RefetchConversations);
                }
                if !is_active {
                    self.conversations.bump_unread(&message.conversation_id);
                }
                None
            }
        }
    }

    /// Merge a global notification. Notifications never populate the
    /// visible message list; for the active conversation the room
    /// stream already delivered the message, so the event is dropped
    /// to avoid double-counting.
    pub fn ingest_notification(&mut self, notification: Notification) -> Option<SideEffect> {
        match notification {
            Notification::ChatMessage {
                conversation_id,
                text,
                created_at,
                ..
            } => {
                if self.active.is_active(&conversation_id) {
                    return None;
                }
                if !self
                    .conversations
                    .apply_preview(&conversation_id, &text, created_at)
                {
                    debug!(
                        "Notification for unknown conversation {}, refetching list",
                        conversation_id
                    );
                    return Some(SideEffect::RefetchConversations);
                }
                self.conversations.bump_unread(&conversation_id);
                None
            }
            Notification::Unknown => {
                debug!("Ignoring notification of unknown kind");
                None
            }
        }
    }

    /// The other party read the conversation; flips the read flag on
    /// every visible message. Non-active conversations keep no read
    /// watermark on this client.
    pub fn ingest_read_receipt(&mut self, conversation_id: &str) {
        if self.active.is_active(conversation_id) {
            self.messages.mark_all_read();
        }
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}
