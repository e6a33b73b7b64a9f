/// REST collaborator — bearer-token JSON API
///
/// Endpoints:
///   GET  /api/conversations
///   GET  /api/conversations/:id/messages   ?limit=N&offset=N
///   POST /api/conversations                body: {"recipient_id":"..."}
///   POST /api/conversations/:id/read
///   GET  /api/messages/unread-count
use crate::chat_types::{Conversation, Message};
use crate::config::Config;
use crate::error::{ChatError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The REST surface the session depends on. Implemented by
/// `RestClient` in production and by in-memory fakes in tests.
#[async_trait]
pub trait ChatApi {
    /// Full conversation list, most recent first
    async fn fetch_conversations(&self) -> Result<Vec<Conversation>>;

    /// One page of message history, ascending by time
    async fn fetch_messages(
        &self,
        conversation_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Message>>;

    /// Idempotent: returns the existing conversation for this pair of
    /// participants if one exists
    async fn create_or_get_conversation(&self, recipient_id: &str) -> Result<Conversation>;

    async fn mark_read(&self, conversation_id: &str) -> Result<()>;

    /// Authoritative unread aggregate for the badge
    async fn fetch_unread_count(&self) -> Result<u64>;
}

#[derive(Debug, Serialize)]
struct CreateConversationRequest<'a> {
    recipient_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct UnreadCountResponse {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
}

pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl RestClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success response into an API error with the server's
    /// message when one is present
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body: ApiErrorBody = response.json().await.unwrap_or(ApiErrorBody { error: None });
        Err(ChatError::Api {
            status: status.as_u16(),
            message: body.error.unwrap_or_else(|| "request failed".to_string()),
        })
    }
}

#[async_trait]
impl ChatApi for RestClient {
    async fn fetch_conversations(&self) -> Result<Vec<Conversation>> {
        debug!("GET /api/conversations");
        let response = self
            .client
            .get(self.url("/api/conversations"))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn fetch_messages(
        &self,
        conversation_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Message>> {
        debug!(
            "GET /api/conversations/{}/messages limit={} offset={}",
            conversation_id, limit, offset
        );
        let response = self
            .client
            .get(self.url(&format!("/api/conversations/{}/messages", conversation_id)))
            .query(&[("limit", limit), ("offset", offset)])
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn create_or_get_conversation(&self, recipient_id: &str) -> Result<Conversation> {
        debug!("POST /api/conversations recipient={}", recipient_id);
        let response = self
            .client
            .post(self.url("/api/conversations"))
            .bearer_auth(&self.token)
            .json(&CreateConversationRequest { recipient_id })
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn mark_read(&self, conversation_id: &str) -> Result<()> {
        debug!("POST /api/conversations/{}/read", conversation_id);
        let response = self
            .client
            .post(self.url(&format!("/api/conversations/{}/read", conversation_id)))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn fetch_unread_count(&self) -> Result<u64> {
        debug!("GET /api/messages/unread-count");
        let response = self
            .client
            .get(self.url("/api/messages/unread-count"))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let body: UnreadCountResponse = Self::check(response).await?.json().await?;
        Ok(body.count)
    }
}
