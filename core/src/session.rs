/// Chat session — wires the reconciler to the REST and transport
/// collaborators and applies its side effects.
///
/// Collaborator failures are caught here and logged; already-applied
/// local state is never rolled back. The client self-heals on the next
/// successful fetch.
use crate::chat_types::{ClientEvent, Conversation, Message, ServerEvent};
use crate::error::Result;
use crate::reconciler::{MessageSource, Reconciler, SideEffect};
use crate::rest::ChatApi;
use crate::transport::Transport;
use tracing::{debug, warn};

pub struct ChatSession<A: ChatApi, T: Transport> {
    reconciler: Reconciler,
    api: A,
    transport: T,
    /// Our own identity, used as sender for optimistic placeholders
    user_id: String,
    history_page_size: usize,
}

impl<A: ChatApi, T: Transport> ChatSession<A, T> {
    pub fn new(api: A, transport: T, user_id: String, history_page_size: usize) -> Self {
        Self {
            reconciler: Reconciler::new(),
            api,
            transport,
            user_id,
            history_page_size,
        }
    }

    /// Replace the conversation list from the server
    pub async fn refresh_conversations(&mut self) -> Result<()> {
        let conversations = self.api.fetch_conversations().await?;
        self.reconciler.replace_conversations(conversations);
        Ok(())
    }

    /// Open a conversation (or close the view with `None`).
    ///
    /// Joins the room, fetches the message history, and marks the
    /// conversation read on both layers. Each step is best-effort: a
    /// failed fetch leaves the previous (now cleared) view and is
    /// logged, and a history response that arrives after the user
    /// switched away is discarded.
    pub async fn set_active(&mut self, conversation_id: Option<String>) {
        let ticket = self.reconciler.set_active(conversation_id.clone());
        let Some(id) = conversation_id else {
            return;
        };

        if let Err(e) = self.transport.emit(ClientEvent::JoinRoom {
            conversation_id: id.clone(),
        }) {
            warn!("Join room {} failed: {}", id, e);
        }

        match self
            .api
            .fetch_messages(&id, self.history_page_size, 0)
            .await
        {
            Ok(history) => {
                if !self.reconciler.load_history(ticket, history) {
                    debug!("History for {} arrived after the view changed", id);
                }
            }
            Err(e) => warn!("History fetch for {} failed: {}", id, e),
        }

        if let Err(e) = self.api.mark_read(&id).await {
            warn!("Mark-read call for {} failed: {}", id, e);
        }
        if let Err(e) = self.transport.emit(ClientEvent::MarkRead {
            conversation_id: id.clone(),
        }) {
            warn!("Mark-read event for {} failed: {}", id, e);
        }
    }

    /// Start (or resume) a direct conversation with a user. The server
    /// call is idempotent for a given pair of participants.
    pub async fn start_conversation(&mut self, recipient_id: &str) -> Result<Conversation> {
        let conversation = self.api.create_or_get_conversation(recipient_id).await?;
        self.reconciler.upsert_conversation(conversation.clone());
        Ok(conversation)
    }

    /// Send a message: insert the optimistic placeholder immediately,
    /// then emit the transport event. An emit failure leaves the
    /// placeholder visible; it is reconciled or replaced on the next
    /// successful history fetch.
    pub async fn send_message(&mut self, conversation_id: &str, recipient_id: &str, text: &str) {
        let placeholder = Message::optimistic(conversation_id, &self.user_id, text);
        let effect = self
            .reconciler
            .ingest_message(placeholder, MessageSource::Optimistic);

        if let Err(e) = self.transport.emit(ClientEvent::SendMessage {
            conversation_id: conversation_id.to_string(),
            recipient_id: recipient_id.to_string(),
            text: text.to_string(),
        }) {
            warn!("Send to {} failed, placeholder kept: {}", conversation_id, e);
        }

        self.apply_effect(effect).await;
    }

    /// Merge one inbound event from the realtime channel
    pub async fn handle_event(&mut self, event: ServerEvent) {
        let effect = match event {
            ServerEvent::MessageReceived { message } => self
                .reconciler
                .ingest_message(message, MessageSource::Socket),
            ServerEvent::Notification { notification } => {
                self.reconciler.ingest_notification(notification)
            }
            ServerEvent::ReadReceipt { conversation_id } => {
                self.reconciler.ingest_read_receipt(&conversation_id);
                None
            }
        };
        self.apply_effect(effect).await;
    }

    async fn apply_effect(&mut self, effect: Option<SideEffect>) {
        match effect {
            Some(SideEffect::RefetchConversations) => {
                if let Err(e) = self.refresh_conversations().await {
                    warn!("Conversation list refetch failed: {}", e);
                }
            }
            None => {}
        }
    }

    /// Local unread aggregate (badge); the authoritative value comes
    /// from `fetch_unread_count`
    pub fn total_unread(&self) -> u32 {
        self.reconciler.conversations().total_unread()
    }

    pub async fn fetch_unread_count(&self) -> Result<u64> {
        self.api.fetch_unread_count().await
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn active_conversation(&self) -> Option<&str> {
        self.reconciler.active_conversation()
    }

    pub fn conversations(&self) -> &[Conversation] {
        self.reconciler.conversations().conversations()
    }

    pub fn messages(&self) -> &[Message] {
        self.reconciler.messages().messages()
    }
}
