/// Shelfchat - realtime chat core for the reading platform client
///
/// Keeps a consistent, deduplicated view of conversations and messages
/// fed by the REST API, the room-scoped message stream, the global
/// notification stream, and optimistic local sends.

pub mod error;
pub mod config;
pub mod chat_types;
pub mod conversation_store;
pub mod message_store;
pub mod active;
pub mod reconciler;
pub mod rest;
pub mod transport;
pub mod session;

pub use chat_types::{ClientEvent, Conversation, Message, Notification, ServerEvent};
pub use config::Config;
pub use error::{ChatError, Result};
pub use reconciler::{MessageSource, Reconciler, SideEffect};
pub use session::ChatSession;
