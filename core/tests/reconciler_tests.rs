/// Reconciler merge-logic tests
/// Covers message identity, ordering, unread accounting, and the
/// refetch fallback against the pure in-memory core.

extern crate shelfchat_core;

use chrono::{DateTime, TimeZone, Utc};
use shelfchat_core::chat_types::{Conversation, Message, Notification};
use shelfchat_core::reconciler::{MessageSource, Reconciler, SideEffect};

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn conv(id: &str, last_at: i64) -> Conversation {
    Conversation {
        id: id.to_string(),
        members: vec!["u1".to_string(), "u2".to_string()],
        last_message_text: String::new(),
        last_message_at: ts(last_at),
        unread_count: 0,
    }
}

fn msg(id: &str, conversation: &str, sender: &str, text: &str, at: i64) -> Message {
    Message {
        id: id.to_string(),
        conversation_id: conversation.to_string(),
        sender_id: sender.to_string(),
        text: text.to_string(),
        created_at: ts(at),
        is_optimistic: false,
        is_read: false,
    }
}

fn chat_notification(conversation: &str, sender: &str, text: &str, at: i64) -> Notification {
    Notification::ChatMessage {
        conversation_id: conversation.to_string(),
        sender_id: sender.to_string(),
        text: text.to_string(),
        created_at: ts(at),
    }
}

/// Reconciler with two known conversations and c1 open
fn with_active_c1() -> Reconciler {
    let mut r = Reconciler::new();
    r.replace_conversations(vec![conv("c1", 100), conv("c2", 50)]);
    r.set_active(Some("c1".to_string()));
    r
}

#[test]
fn test_duplicate_confirmed_id_discarded() {
    let mut r = with_active_c1();

    let m = msg("m1", "c1", "u2", "hello", 200);
    assert_eq!(r.ingest_message(m.clone(), MessageSource::Socket), None);
    assert_eq!(r.ingest_message(m, MessageSource::Socket), None);

    // One entry, and the conversation state is identical to a single delivery
    assert_eq!(r.messages().len(), 1);
    let c1 = r.conversations().get("c1").unwrap();
    assert_eq!(c1.last_message_text, "hello");
    assert_eq!(c1.unread_count, 0);
}

#[test]
fn test_optimistic_replacement_preserves_position() {
    let mut r = with_active_c1();
    r.ingest_message(msg("m0", "c1", "u2", "earlier", 150), MessageSource::Socket);
    r.ingest_message(
        Message::optimistic("c1", "u1", "Hi"),
        MessageSource::Optimistic,
    );
    r.ingest_message(msg("m2", "c1", "u2", "later", 250), MessageSource::Socket);
    assert_eq!(r.messages().len(), 3);

    // Server confirmation lands in the placeholder's slot
    r.ingest_message(msg("m1", "c1", "u1", "Hi", 260), MessageSource::Socket);
    assert_eq!(r.messages().len(), 3);
    let middle = &r.messages().messages()[1];
    assert_eq!(middle.id, "m1");
    assert!(!middle.is_optimistic);
}

#[test]
fn test_send_then_confirm_single_entry() {
    let mut r = with_active_c1();

    r.ingest_message(
        Message::optimistic("c1", "u1", "Hi"),
        MessageSource::Optimistic,
    );
    assert_eq!(r.messages().len(), 1);
    assert!(r.messages().messages()[0].is_optimistic);

    r.ingest_message(msg("m1", "c1", "u1", "Hi", 300), MessageSource::Socket);
    assert_eq!(r.messages().len(), 1);
    assert_eq!(r.messages().messages()[0].id, "m1");
    assert!(!r.messages().messages()[0].is_optimistic);
}

#[test]
fn test_unread_isolation() {
    let mut r = with_active_c1();

    // Events for the active conversation never bump its counter
    r.ingest_message(msg("m1", "c1", "u2", "a", 200), MessageSource::Socket);
    r.ingest_notification(chat_notification("c1", "u2", "a", 200));
    assert_eq!(r.conversations().get("c1").unwrap().unread_count, 0);

    // Every accepted event for an inactive conversation bumps by one
    r.ingest_notification(chat_notification("c2", "u2", "b", 210));
    assert_eq!(r.conversations().get("c2").unwrap().unread_count, 1);
    r.ingest_notification(chat_notification("c2", "u2", "c", 220));
    assert_eq!(r.conversations().get("c2").unwrap().unread_count, 2);
    r.ingest_message(msg("m2", "c2", "u2", "d", 230), MessageSource::Socket);
    assert_eq!(r.conversations().get("c2").unwrap().unread_count, 3);
}

#[test]
fn test_notification_for_active_conversation_discarded() {
    let mut r = with_active_c1();
    r.ingest_message(msg("m1", "c1", "u2", "via room", 200), MessageSource::Socket);

    // The notification for the same event must not touch list or counters
    let effect = r.ingest_notification(chat_notification("c1", "u2", "via room", 200));
    assert_eq!(effect, None);
    assert_eq!(r.messages().len(), 1);
    assert_eq!(r.conversations().get("c1").unwrap().unread_count, 0);
}

#[test]
fn test_conversation_list_sorted_by_recency() {
    let mut r = with_active_c1();
    assert_eq!(r.conversations().conversations()[0].id, "c1");

    // c2 receives the newest message and moves to the top
    r.ingest_message(msg("m1", "c2", "u2", "newest", 500), MessageSource::Socket);
    let ids: Vec<&str> = r
        .conversations()
        .conversations()
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(ids, vec!["c2", "c1"]);
}

#[test]
fn test_unknown_conversation_triggers_refetch() {
    let mut r = with_active_c1();

    let effect = r.ingest_message(msg("m9", "c9", "u9", "first", 400), MessageSource::Socket);
    assert_eq!(effect, Some(SideEffect::RefetchConversations));

    // Nothing is synthesized in place before the refetch completes
    assert!(!r.conversations().contains("c9"));
    assert_eq!(r.conversations().len(), 2);
}

#[test]
fn test_unknown_conversation_notification_triggers_refetch() {
    let mut r = with_active_c1();
    let effect = r.ingest_notification(chat_notification("c9", "u9", "x", 400));
    assert_eq!(effect, Some(SideEffect::RefetchConversations));
    assert!(!r.conversations().contains("c9"));
}

#[test]
fn test_read_receipt_marks_visible_messages() {
    let mut r = with_active_c1();
    let ticket = r.set_active(Some("c1".to_string()));
    r.load_history(
        ticket,
        vec![
            msg("m1", "c1", "u2", "a", 100),
            msg("m2", "c1", "u1", "b", 110),
            msg("m3", "c1", "u2", "c", 120),
        ],
    );

    r.ingest_read_receipt("c1");
    assert!(r.messages().messages().iter().all(|m| m.is_read));

    // A later message defaults to unread until the next receipt
    r.ingest_message(msg("m4", "c1", "u2", "d", 130), MessageSource::Socket);
    assert!(!r.messages().messages()[3].is_read);
}

#[test]
fn test_read_receipt_for_inactive_conversation_ignored() {
    let mut r = with_active_c1();
    r.ingest_message(msg("m1", "c1", "u2", "a", 200), MessageSource::Socket);

    r.ingest_read_receipt("c2");
    assert!(!r.messages().messages()[0].is_read);
}

#[test]
fn test_stale_history_fetch_discarded() {
    let mut r = Reconciler::new();
    r.replace_conversations(vec![conv("c1", 100), conv("c2", 50)]);

    let first = r.set_active(Some("c1".to_string()));
    let second = r.set_active(Some("c2".to_string()));

    // The c1 response resolves after the user switched to c2
    assert!(!r.load_history(first, vec![msg("m1", "c1", "u2", "old", 90)]));
    assert!(r.messages().is_empty());

    assert!(r.load_history(second, vec![msg("m2", "c2", "u2", "new", 95)]));
    assert_eq!(r.messages().len(), 1);
}

#[test]
fn test_set_active_resets_unread() {
    let mut r = with_active_c1();
    r.ingest_notification(chat_notification("c2", "u2", "x", 210));
    r.ingest_notification(chat_notification("c2", "u2", "y", 220));
    assert_eq!(r.conversations().get("c2").unwrap().unread_count, 2);

    r.set_active(Some("c2".to_string()));
    assert_eq!(r.conversations().get("c2").unwrap().unread_count, 0);
    assert_eq!(r.conversations().total_unread(), 0);
}

#[test]
fn test_replace_conversations_keeps_active_at_zero() {
    let mut r = with_active_c1();

    // Server still reports unread for c1 (e.g. mark-read call failed)
    let mut stale = conv("c1", 100);
    stale.unread_count = 5;
    r.replace_conversations(vec![stale, conv("c2", 50)]);

    assert_eq!(r.conversations().get("c1").unwrap().unread_count, 0);
}

#[test]
fn test_inactive_conversation_message_not_appended() {
    let mut r = with_active_c1();

    r.ingest_message(msg("m1", "c2", "u2", "elsewhere", 300), MessageSource::Socket);
    assert!(r.messages().is_empty());

    let c2 = r.conversations().get("c2").unwrap();
    assert_eq!(c2.last_message_text, "elsewhere");
    assert_eq!(c2.unread_count, 1);
}

#[test]
fn test_placeholder_not_consumed_by_other_room() {
    let mut r = with_active_c1();
    r.ingest_message(
        Message::optimistic("c1", "u1", "hi"),
        MessageSource::Optimistic,
    );

    // Same sender and text, different conversation
    r.ingest_message(msg("m1", "c2", "u1", "hi", 300), MessageSource::Socket);
    assert_eq!(r.messages().len(), 1);
    assert!(r.messages().messages()[0].is_optimistic);
}

#[test]
fn test_optimistic_send_updates_preview_without_unread() {
    let mut r = with_active_c1();

    let effect = r.ingest_message(
        Message::optimistic("c2", "u1", "sent elsewhere"),
        MessageSource::Optimistic,
    );
    assert_eq!(effect, None);

    // Not appended (c2 is not the open view), preview updated, no unread
    assert!(r.messages().is_empty());
    let c2 = r.conversations().get("c2").unwrap();
    assert_eq!(c2.last_message_text, "sent elsewhere");
    assert_eq!(c2.unread_count, 0);
}

#[test]
fn test_unknown_notification_kind_ignored() {
    let mut r = with_active_c1();
    let before: Vec<String> = r
        .conversations()
        .conversations()
        .iter()
        .map(|c| c.id.clone())
        .collect();

    assert_eq!(r.ingest_notification(Notification::Unknown), None);
    let after: Vec<String> = r
        .conversations()
        .conversations()
        .iter()
        .map(|c| c.id.clone())
        .collect();
    assert_eq!(before, after);
    assert_eq!(r.conversations().total_unread(), 0);
}

#[test]
fn test_leaving_view_stops_list_merges_but_not_counters() {
    let mut r = with_active_c1();
    r.set_active(None);

    r.ingest_message(msg("m1", "c1", "u2", "while away", 400), MessageSource::Socket);
    assert!(r.messages().is_empty());

    // Store updates continue to apply
    let c1 = r.conversations().get("c1").unwrap();
    assert_eq!(c1.last_message_text, "while away");
    assert_eq!(c1.unread_count, 1);
}
