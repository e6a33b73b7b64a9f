/// Realtime transport — websocket channel for room events and global
/// notifications. One instance per authenticated session.
use crate::chat_types::{ClientEvent, ServerEvent};
use crate::config::Config;
use crate::error::{ChatError, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::{debug, info, warn};

/// Outbound side of the event channel the session depends on.
/// `emit` queues the event; delivery is handled by a background task.
pub trait Transport {
    fn emit(&self, event: ClientEvent) -> Result<()>;
}

pub struct SocketTransport {
    outgoing: mpsc::UnboundedSender<ClientEvent>,
    /// Taken once by the session's event pump
    events: Option<mpsc::UnboundedReceiver<ServerEvent>>,
}

impl SocketTransport {
    /// Connect and authenticate with the session token. Spawns one
    /// task draining outbound events and one forwarding parsed inbound
    /// events; both end when the socket closes.
    pub async fn connect(config: &Config) -> Result<Self> {
        let url = format!("{}?token={}", config.socket_url, config.token);
        let (ws_stream, _) = connect_async(&url)
            .await
            .map_err(|e| ChatError::Transport(format!("connect failed: {}", e)))?;
        info!("Connected to realtime channel at {}", config.socket_url);

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        let (outgoing_tx, mut outgoing_rx) = mpsc::unbounded_channel::<ClientEvent>();
        let (events_tx, events_rx) = mpsc::unbounded_channel::<ServerEvent>();

        tokio::spawn(async move {
            while let Some(event) = outgoing_rx.recv().await {
                let json = match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Failed to serialize outbound event: {}", e);
                        continue;
                    }
                };
                if let Err(e) = ws_sender.send(WsMessage::Text(json)).await {
                    warn!("Outbound send failed, stopping writer: {}", e);
                    break;
                }
            }
        });

        tokio::spawn(async move {
            while let Some(frame) = ws_receiver.next().await {
                match frame {
                    Ok(WsMessage::Text(text)) => match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(event) => {
                            if events_tx.send(event).is_err() {
                                debug!("Event receiver dropped, stopping reader");
                                break;
                            }
                        }
                        Err(e) => warn!("Unparseable inbound event: {} ({})", e, text),
                    },
                    Ok(WsMessage::Close(_)) => {
                        info!("Realtime channel closed by server");
                        break;
                    }
                    Ok(_) => {
                        // Binary, ping and pong frames carry no chat events
                    }
                    Err(e) => {
                        warn!("Realtime channel error: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(Self {
            outgoing: outgoing_tx,
            events: Some(events_rx),
        })
    }

    /// Take the inbound event stream; can be called only once
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<ServerEvent>> {
        self.events.take()
    }
}

impl Transport for SocketTransport {
    fn emit(&self, event: ClientEvent) -> Result<()> {
        self.outgoing
            .send(event)
            .map_err(|_| ChatError::Transport("channel writer ended".to_string()))
    }
}
