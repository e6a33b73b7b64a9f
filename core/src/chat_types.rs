/// Shared types for the chat layer
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix marking locally generated placeholder ids for optimistic sends
pub const LOCAL_ID_PREFIX: &str = "local-";

/// One conversation thread as shown in the list view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Opaque stable identifier assigned by the server
    pub id: String,
    /// Participant user ids (exactly two for a direct chat)
    pub members: Vec<String>,
    /// Preview text of the last accepted message
    pub last_message_text: String,
    /// Timestamp of the last accepted message (sort key for the list)
    pub last_message_at: DateTime<Utc>,
    /// Messages received while the conversation was not active
    #[serde(default)]
    pub unread_count: u32,
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Server-assigned id, or a `local-` placeholder while optimistic
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// True only for a local placeholder awaiting server confirmation
    #[serde(default)]
    pub is_optimistic: bool,
    /// Set by a read-receipt for the whole conversation
    #[serde(default)]
    pub is_read: bool,
}

impl Message {
    /// Build a local placeholder for an in-flight send
    pub fn optimistic(conversation_id: &str, sender_id: &str, text: &str) -> Self {
        Self {
            id: format!("{}{}", LOCAL_ID_PREFIX, Uuid::new_v4()),
            conversation_id: conversation_id.to_string(),
            sender_id: sender_id.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
            is_optimistic: true,
            is_read: false,
        }
    }
}

/// Global notification payload, delivered regardless of room membership.
/// The server may add kinds at any time; unrecognized ones decode to `Unknown`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notification {
    #[serde(rename = "CHAT_MESSAGE")]
    ChatMessage {
        conversation_id: String,
        sender_id: String,
        text: String,
        created_at: DateTime<Utc>,
    },
    #[serde(other)]
    Unknown,
}

/// Inbound events on the realtime channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A new message in a room this client has joined
    MessageReceived { message: Message },
    /// Global notification (not room-scoped)
    Notification { notification: Notification },
    /// The other party read the conversation
    ReadReceipt { conversation_id: String },
}

/// Outbound events on the realtime channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinRoom {
        conversation_id: String,
    },
    SendMessage {
        conversation_id: String,
        recipient_id: String,
        text: String,
    },
    MarkRead {
        conversation_id: String,
    },
}
