//! Tests for the Telegram channel module.

use super::polling::update_to_event;
use super::send::is_not_modified;
use super::types::*;
use super::TelegramChannel;
use crate::utils::split_message;
use folio_core::config::TelegramConfig;
use folio_core::message::{EventKind, InlineButton, MessageRef};

#[test]
fn test_split_short_message() {
    let chunks = split_message("hello", 4096);
    assert_eq!(chunks, vec!["hello"]);
}

#[test]
fn test_split_long_message() {
    let text = "a\n".repeat(3000);
    let chunks = split_message(&text, 4096);
    assert!(chunks.len() >= 2);
    for chunk in &chunks {
        assert!(chunk.len() <= 4096);
    }
    assert_eq!(chunks.concat(), text);
}

#[test]
fn test_split_multibyte_without_newlines() {
    // 3 bytes per char; 10 bytes never lands on a boundary.
    let text = "留言".repeat(20);
    let chunks = split_message(&text, 10);
    for chunk in &chunks {
        assert!(chunk.len() <= 10);
        assert!(!chunk.is_empty());
    }
    assert_eq!(chunks.concat(), text);
}

fn parse_update(json: &str) -> TgUpdate {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_text_message_becomes_text_event() {
    let update = parse_update(
        r#"{
            "update_id": 10,
            "message": {
                "message_id": 55,
                "from": {"id": 7, "is_bot": false, "first_name": "Li", "last_name": "Lei", "username": "lilei"},
                "chat": {"id": 7, "type": "private"},
                "text": "Hello"
            }
        }"#,
    );
    let event = update_to_event(update, None).unwrap();
    assert_eq!(event.channel, "telegram");
    assert_eq!(event.chat_id, 7);
    assert_eq!(event.sender.id, 7);
    assert_eq!(event.sender.username.as_deref(), Some("lilei"));
    assert_eq!(event.sender.display_name, "Li Lei");
    assert_eq!(
        event.kind,
        EventKind::Text {
            message_id: 55,
            text: "Hello".into(),
        }
    );
}

#[test]
fn test_start_becomes_command_event() {
    let update = parse_update(
        r#"{
            "update_id": 11,
            "message": {
                "message_id": 1,
                "from": {"id": 7, "first_name": "Li"},
                "chat": {"id": 7},
                "text": "/start"
            }
        }"#,
    );
    let event = update_to_event(update, None).unwrap();
    assert!(matches!(event.kind, EventKind::Command { ref name, .. } if name == "start"));
    assert_eq!(event.sender.display_name, "Li");
    assert!(event.sender.username.is_none());
}

#[test]
fn test_command_for_another_bot_is_plain_text() {
    let json = r#"{
        "update_id": 18,
        "message": {
            "message_id": 9,
            "from": {"id": 7, "first_name": "Li"},
            "chat": {"id": -500},
            "text": "/start@other_bot"
        }
    }"#;
    let event = update_to_event(parse_update(json), Some("folio_bot")).unwrap();
    assert!(matches!(event.kind, EventKind::Text { .. }));

    let event = update_to_event(
        parse_update(&json.replace("other_bot", "folio_bot")),
        Some("folio_bot"),
    )
    .unwrap();
    assert!(matches!(event.kind, EventKind::Command { ref name, .. } if name == "start"));
}

#[test]
fn test_callback_query_becomes_callback_event() {
    let update = parse_update(
        r#"{
            "update_id": 12,
            "callback_query": {
                "id": "cbq-1",
                "from": {"id": 7, "is_bot": false, "first_name": "Li", "username": "lilei"},
                "message": {
                    "message_id": 90,
                    "from": {"id": 999, "is_bot": true, "first_name": "Folio"},
                    "chat": {"id": 7, "type": "private"},
                    "text": "choose"
                },
                "data": "lang_cn"
            }
        }"#,
    );
    let event = update_to_event(update, None).unwrap();
    // The sender is the user who pressed, not the bot that owns the message.
    assert_eq!(event.sender.id, 7);
    assert_eq!(
        event.kind,
        EventKind::Callback {
            callback_id: "cbq-1".into(),
            data: "lang_cn".into(),
            message: Some(MessageRef {
                chat_id: 7,
                message_id: 90,
            }),
        }
    );
}

#[test]
fn test_callback_without_message_uses_private_chat() {
    let update = parse_update(
        r#"{
            "update_id": 13,
            "callback_query": {
                "id": "cbq-2",
                "from": {"id": 8, "first_name": "Han"},
                "data": "ask_question"
            }
        }"#,
    );
    let event = update_to_event(update, None).unwrap();
    assert_eq!(event.chat_id, 8);
    assert!(matches!(event.kind, EventKind::Callback { message: None, .. }));
}

#[test]
fn test_non_text_and_bot_updates_skipped() {
    let photo_only = parse_update(
        r#"{
            "update_id": 14,
            "message": {
                "message_id": 2,
                "from": {"id": 7, "first_name": "Li"},
                "chat": {"id": 7},
                "photo": [{"file_id": "x", "width": 1, "height": 1}]
            }
        }"#,
    );
    assert!(update_to_event(photo_only, None).is_none());

    let from_bot = parse_update(
        r#"{
            "update_id": 15,
            "message": {
                "message_id": 3,
                "from": {"id": 5, "is_bot": true, "first_name": "Other"},
                "chat": {"id": 7},
                "text": "hi"
            }
        }"#,
    );
    assert!(update_to_event(from_bot, None).is_none());

    let no_sender = parse_update(
        r#"{"update_id": 16, "message": {"message_id": 4, "chat": {"id": -100}, "text": "hi"}}"#,
    );
    assert!(update_to_event(no_sender, None).is_none());

    let empty = parse_update(r#"{"update_id": 17}"#);
    assert!(update_to_event(empty, None).is_none());
}

#[test]
fn test_keyboard_markup_serialization() {
    let keyboard = vec![vec![
        InlineButton {
            text: "🇨🇳".into(),
            callback_data: "lang_cn".into(),
        },
        InlineButton {
            text: "🇺🇸".into(),
            callback_data: "lang_en".into(),
        },
    ]];
    let value = serde_json::to_value(TgInlineKeyboardMarkup::from(&keyboard)).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "inline_keyboard": [[
                {"text": "🇨🇳", "callback_data": "lang_cn"},
                {"text": "🇺🇸", "callback_data": "lang_en"}
            ]]
        })
    );
}

#[test]
fn test_error_response_parsing() {
    let resp: TgResponse<bool> = serde_json::from_str(
        r#"{"ok": false, "error_code": 400, "description": "Bad Request: message is not modified"}"#,
    )
    .unwrap();
    assert!(!resp.ok);
    assert!(resp.result.is_none());
    assert!(is_not_modified(&resp.description.unwrap()));
    assert!(!is_not_modified("Bad Request: message to edit not found"));
}

#[tokio::test]
async fn test_transport_error_hides_bot_token() {
    let mut channel = TelegramChannel::new(TelegramConfig {
        bot_token: "123456:SECRET-TOKEN".into(),
        ..Default::default()
    });
    // Nothing listens on port 1, so the request fails before any response.
    channel.base_url = "http://127.0.0.1:1/bot123456:SECRET-TOKEN".into();

    let err = channel
        .send_text(7, "hello", None)
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("sendMessage"), "got: {err}");
    assert!(!err.contains("SECRET-TOKEN"), "token leaked: {err}");
}
