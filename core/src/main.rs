/// Shelfchat client - interactive entry point
use shelfchat_core::rest::RestClient;
use shelfchat_core::transport::SocketTransport;
use shelfchat_core::{ChatSession, Config, ServerEvent};
use std::env;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse configuration
    let args: Vec<String> = env::args().collect();
    let config = Config::from_args(&args)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    let api = RestClient::new(&config)
        .map_err(|e| anyhow::anyhow!("REST client error: {}", e))?;
    let mut transport = SocketTransport::connect(&config)
        .await
        .map_err(|e| anyhow::anyhow!("Transport error: {}", e))?;
    let mut events = transport
        .take_events()
        .ok_or_else(|| anyhow::anyhow!("Transport event stream unavailable"))?;

    let mut session = ChatSession::new(
        api,
        transport,
        config.user_id.clone(),
        config.history_page_size,
    );

    info!("Session started for user {}", config.user_id);
    session
        .refresh_conversations()
        .await
        .map_err(|e| anyhow::anyhow!("Initial conversation fetch failed: {}", e))?;
    print_conversations(&session);
    println!("Commands: /list  /open <conversation>  /to <user> <text>  /quit  (plain text sends to the open conversation)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    info!("Realtime channel ended, exiting");
                    break;
                };
                let echo = inbound_line(&session, &event);
                session.handle_event(event).await;
                if let Some(line) = echo {
                    println!("{}", line);
                }
            }
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { break };
                if !handle_command(&mut session, line.trim()).await? {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Render an inbound event for the terminal before it is merged
fn inbound_line<A, T>(session: &ChatSession<A, T>, event: &ServerEvent) -> Option<String>
where
    A: shelfchat_core::rest::ChatApi,
    T: shelfchat_core::transport::Transport,
{
    match event {
        ServerEvent::MessageReceived { message }
            if session.active_conversation() == Some(message.conversation_id.as_str()) =>
        {
            Some(format!("[{}] {}", message.sender_id, message.text))
        }
        ServerEvent::ReadReceipt { conversation_id }
            if session.active_conversation() == Some(conversation_id.as_str()) =>
        {
            Some("(read)".to_string())
        }
        _ => None,
    }
}

/// Returns false when the client should exit
async fn handle_command<A, T>(
    session: &mut ChatSession<A, T>,
    line: &str,
) -> anyhow::Result<bool>
where
    A: shelfchat_core::rest::ChatApi,
    T: shelfchat_core::transport::Transport,
{
    if line.is_empty() {
        return Ok(true);
    }

    if let Some(rest) = line.strip_prefix("/open ") {
        let id = rest.trim().to_string();
        session.set_active(Some(id.clone())).await;
        println!("-- opened {} ({} messages)", id, session.messages().len());
        for m in session.messages() {
            println!("[{}] {}", m.sender_id, m.text);
        }
        return Ok(true);
    }

    if let Some(rest) = line.strip_prefix("/to ") {
        let mut parts = rest.trim().splitn(2, ' ');
        let (Some(user), Some(text)) = (parts.next(), parts.next()) else {
            println!("Usage: /to <user> <text>");
            return Ok(true);
        };
        match session.start_conversation(user).await {
            Ok(conversation) => {
                let recipient = user.to_string();
                let id = conversation.id.clone();
                session.set_active(Some(id.clone())).await;
                session.send_message(&id, &recipient, text).await;
            }
            Err(e) => println!("Could not start conversation with {}: {}", user, e),
        }
        return Ok(true);
    }

    match line {
        "/list" => {
            print_conversations(session);
        }
        "/quit" => return Ok(false),
        text if text.starts_with('/') => {
            println!("Unknown command: {}", text);
        }
        text => {
            let Some(active) = session.active_conversation().map(str::to_string) else {
                println!("No conversation open; use /open or /to first");
                return Ok(true);
            };
            let me = session.user_id().to_string();
            let recipient = session
                .conversations()
                .iter()
                .find(|c| c.id == active)
                .and_then(|c| c.members.iter().find(|m| **m != me).cloned())
                .unwrap_or_default();
            session.send_message(&active, &recipient, text).await;
        }
    }
    Ok(true)
}

fn print_conversations<A, T>(session: &ChatSession<A, T>)
where
    A: shelfchat_core::rest::ChatApi,
    T: shelfchat_core::transport::Transport,
{
    println!("-- {} conversations, {} unread", session.conversations().len(), session.total_unread());
    for c in session.conversations() {
        let marker = if c.unread_count > 0 {
            format!(" ({} unread)", c.unread_count)
        } else {
            String::new()
        };
        println!("  {}{}: {}", c.id, marker, c.last_message_text);
    }
}
