/// Active-conversation tracker.
/// Holds the single "which conversation is open" pointer and a
/// generation counter so a history fetch issued for an earlier
/// activation can be recognized as stale and discarded.
#[derive(Debug, Default)]
pub struct ActiveConversation {
    current: Option<String>,
    generation: u64,
}

/// Issued by `set` and presented back with the fetch result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

impl ActiveConversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point at a new conversation (or none). Every call invalidates
    /// tickets from earlier activations.
    pub fn set(&mut self, conversation_id: Option<String>) -> FetchTicket {
        self.current = conversation_id;
        self.generation += 1;
        FetchTicket {
            generation: self.generation,
        }
    }

    pub fn get(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_active(&self, conversation_id: &str) -> bool {
        self.current.as_deref() == Some(conversation_id)
    }

    /// True if the ticket belongs to the latest activation
    pub fn accepts(&self, ticket: FetchTicket) -> bool {
        ticket.generation == self.generation
    }
}
