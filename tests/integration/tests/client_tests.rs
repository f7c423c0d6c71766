//! Client Integration Tests
//!
//! Exercises the HTTP transport end to end against the in-process mock API.
//! No external services are required.
//!
//! Run with: cargo test -p integration-tests --test client_tests

use std::sync::Arc;

use axum::http::StatusCode;
use chat_client::{Action, RestContext, RestError};
use chat_core::{AccountType, Embed, Emote, Message, MessageAttachment, Permissions, Snowflake};
use integration_tests::{fixtures::*, test_config, TestClient};
use parking_lot::Mutex;
use serde_json::json;

const CHANNEL: u64 = TestClient::CHANNEL_ID;

// ============================================================================
// Message Sending Tests
// ============================================================================

#[tokio::test]
async fn test_send_message_json_body() {
    let client = TestClient::start(text_permissions()).await.unwrap();
    client
        .api
        .respond_with(StatusCode::OK, Some(message_json(500, CHANNEL, "hello")));

    let action = client.channel.send_message("hello").unwrap();
    let message = action.complete().await.unwrap();
    assert_eq!(message.id, Snowflake::new(500));
    assert_eq!(message.content, "hello");

    let request = client.api.last_request().unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "channels/10/messages");
    assert_eq!(request.authorization.as_deref(), Some("Bot secret-token"));
    assert!(request.user_agent.is_some());
    assert!(request
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("application/json")));
    assert_eq!(request.raw_body.as_deref(), Some(r#"{"content":"hello","tts":false}"#));
}

#[tokio::test]
async fn test_client_account_sends_raw_token() {
    let client = TestClient::start_as(text_permissions(), AccountType::Client)
        .await
        .unwrap();
    client
        .api
        .respond_with(StatusCode::OK, Some(message_json(501, CHANNEL, "hi")));

    client.channel.send_message("hi").unwrap().complete().await.unwrap();
    let request = client.api.last_request().unwrap();
    assert_eq!(request.authorization.as_deref(), Some("secret-token"));
}

#[tokio::test]
async fn test_edit_with_override_replaces_fields() {
    let client = TestClient::start(text_permissions()).await.unwrap();
    client
        .api
        .respond_with(StatusCode::OK, Some(message_json(20, CHANNEL, "hello")));

    let source = Message::new(Snowflake::new(20), Snowflake::new(CHANNEL), "hello");
    let mut action = client.channel.edit_message_by_id("20", &source).unwrap();
    action.override_fields(true);
    action.complete().await.unwrap();

    let request = client.api.last_request().unwrap();
    assert_eq!(request.method, "PATCH");
    assert_eq!(request.path, "channels/10/messages/20");
    assert_eq!(
        request.raw_body.as_deref(),
        Some(r#"{"embed":null,"content":"hello","nonce":null,"tts":false}"#)
    );
}

#[tokio::test]
async fn test_send_embed_message() {
    let client = TestClient::start(text_permissions()).await.unwrap();
    client
        .api
        .respond_with(StatusCode::OK, Some(message_json(502, CHANNEL, "")));

    let mut action = client.channel.send_message("release notes").unwrap();
    action
        .embed(Some(Embed::new().title("v1.2").field("Fixes", "3", true)))
        .unwrap()
        .nonce(Some("abc"));
    action.complete().await.unwrap();

    let body = client.api.last_request().unwrap().json().unwrap();
    assert_eq!(body["embed"]["title"], "v1.2");
    assert_eq!(body["embed"]["fields"][0]["name"], "Fixes");
    assert_eq!(body["content"], "release notes");
    assert_eq!(body["nonce"], "abc");
}

#[tokio::test]
async fn test_send_file_multipart_layout() {
    let client = TestClient::start(text_permissions()).await.unwrap();
    client
        .api
        .respond_with(StatusCode::OK, Some(message_json(503, CHANNEL, "caption")));

    let caption = Message::new(Snowflake::new(1), Snowflake::new(CHANNEL), "caption");
    let mut action = client
        .channel
        .send_file(b"first".to_vec(), "one.png", Some(&caption))
        .unwrap();
    action.add_file(b"second".to_vec(), "two.txt").unwrap();
    action.complete().await.unwrap();

    let request = client.api.last_request().unwrap();
    assert!(request
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("multipart/form-data")));
    assert_eq!(request.parts.len(), 3);

    let first = request.part("file0").unwrap();
    assert_eq!(first.filename.as_deref(), Some("one.png"));
    assert_eq!(first.content_type.as_deref(), Some("application/octet-stream"));
    assert_eq!(first.data, b"first");

    let second = request.part("file1").unwrap();
    assert_eq!(second.filename.as_deref(), Some("two.txt"));
    assert_eq!(second.data, b"second");

    let payload = request.part("payload_json").unwrap();
    assert_eq!(payload.text(), Some(r#"{"content":"caption","tts":false}"#));
}

#[tokio::test]
async fn test_file_only_upload_omits_payload() {
    let client = TestClient::start(text_permissions()).await.unwrap();
    client
        .api
        .respond_with(StatusCode::OK, Some(message_json(504, CHANNEL, "")));

    client
        .channel
        .send_file(vec![7u8; 64], "blob.bin", None)
        .unwrap()
        .complete()
        .await
        .unwrap();

    let request = client.api.last_request().unwrap();
    assert_eq!(request.parts.len(), 1);
    assert!(request.part("payload_json").is_none());
}

// ============================================================================
// Callback Tests
// ============================================================================

#[tokio::test]
async fn test_failure_callback_receives_platform_error() {
    let client = TestClient::start(text_permissions()).await.unwrap();
    client.api.respond_with(
        StatusCode::FORBIDDEN,
        Some(error_json(50013, "Missing Permissions")),
    );

    let outcomes = Arc::new(Mutex::new(Vec::new()));
    let on_ok = Arc::clone(&outcomes);
    let on_err = Arc::clone(&outcomes);

    let mut action = client.channel.send_message("denied").unwrap();
    action
        .on_success(move |message| on_ok.lock().push(format!("ok:{}", message.id)))
        .on_failure(move |failure| {
            on_err.lock().push(format!(
                "err:{}:{}:{}",
                failure.status,
                failure.code.unwrap_or_default(),
                failure.message.unwrap_or_default()
            ));
        });
    action.execute().await.unwrap();

    assert_eq!(
        *outcomes.lock(),
        vec!["err:403:50013:Missing Permissions".to_string()]
    );
}

#[tokio::test]
async fn test_success_callback_receives_message() {
    let client = TestClient::start(text_permissions()).await.unwrap();
    client
        .api
        .respond_with(StatusCode::OK, Some(message_json(505, CHANNEL, "yay")));

    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    let mut action = client.channel.send_message("yay").unwrap();
    action.on_success(move |message| *sink.lock() = Some(message.id));
    action.execute().await.unwrap();

    assert_eq!(*seen.lock(), Some(Snowflake::new(505)));
}

#[tokio::test]
async fn test_transport_error_is_returned_to_caller() {
    let context = RestContext::from_config(&test_config("http://127.0.0.1:1/api/v6", AccountType::Bot))
        .unwrap();
    let guild_id = Snowflake::new(1);
    let guild = chat_client::Guild::new(
        context,
        guild_id,
        "offline",
        chat_core::Member::new(guild_id, Snowflake::new(2), text_permissions()),
    )
    .unwrap();
    let channel = guild.create_text_channel(Snowflake::new(CHANNEL), "general", 0);

    let called = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&called);
    let mut action = channel.send_message("anyone?").unwrap();
    action.on_failure(move |_| *flag.lock() = true);

    let err = action.execute().await.unwrap_err();
    assert!(matches!(err, RestError::Transport(_)));
    assert!(!*called.lock());
}

// ============================================================================
// Channel Operation Tests
// ============================================================================

#[tokio::test]
async fn test_bulk_delete_request() {
    let client = TestClient::start(text_permissions()).await.unwrap();
    let ids = fresh_message_ids(3);

    client
        .channel
        .delete_messages_by_ids(ids.clone())
        .unwrap()
        .complete()
        .await
        .unwrap();

    let request = client.api.last_request().unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "channels/10/messages/bulk-delete");
    assert_eq!(request.json(), Some(json!({ "messages": ids })));
}

#[tokio::test]
async fn test_rejected_operations_send_nothing() {
    let client = TestClient::start(Permissions::MESSAGE_READ).await.unwrap();

    assert!(client.channel.send_message("hi").is_err());
    assert!(client.channel.delete_messages_by_ids(fresh_message_ids(2)).is_err());
    assert!(client.channel.webhooks().is_err());
    assert!(client.channel.clear_reactions_by_id("1").is_err());
    assert!(client.api.requests().is_empty());
}

#[tokio::test]
async fn test_webhooks_listing_skips_malformed() {
    let client = TestClient::start(text_permissions()).await.unwrap();
    client.api.respond_with(
        StatusCode::OK,
        Some(json!([
            webhook_json(1, CHANNEL, "deploys"),
            { "name": "broken" },
            webhook_json(2, CHANNEL, "alerts")
        ])),
    );

    let hooks = client.channel.webhooks().unwrap().complete().await.unwrap();
    let names: Vec<_> = hooks.iter().filter_map(|h| h.name.clone()).collect();
    assert_eq!(names, vec!["deploys", "alerts"]);
    assert_eq!(client.api.last_request().unwrap().path, "channels/10/webhooks");
}

#[tokio::test]
async fn test_delete_webhook_route() {
    let client = TestClient::start(text_permissions()).await.unwrap();
    client
        .channel
        .delete_webhook_by_id("77")
        .unwrap()
        .complete()
        .await
        .unwrap();

    let request = client.api.last_request().unwrap();
    assert_eq!(request.method, "DELETE");
    assert_eq!(request.path, "webhooks/77");
}

#[tokio::test]
async fn test_history_around_query() {
    let client = TestClient::start(text_permissions()).await.unwrap();
    client.api.respond_with(
        StatusCode::OK,
        Some(json!([
            message_json(12, CHANNEL, "after"),
            message_json(11, CHANNEL, "target"),
            message_json(10, CHANNEL, "before")
        ])),
    );

    let history = client
        .channel
        .history_around("11", 3)
        .unwrap()
        .complete()
        .await
        .unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(
        history.message_by_id(Snowflake::new(11)).map(|m| m.content.as_str()),
        Some("target")
    );

    let request = client.api.last_request().unwrap();
    assert_eq!(request.method, "GET");
    assert_eq!(request.path, "channels/10/messages");
    assert_eq!(request.query.as_deref(), Some("around=11&limit=3"));
}

#[tokio::test]
async fn test_reactions_and_pins() {
    let client = TestClient::start(text_permissions()).await.unwrap();

    client.channel.add_reaction_by_id("5", "👍").unwrap().complete().await.unwrap();
    let emote = Emote::new(Snowflake::new(42), "party");
    client
        .channel
        .add_emote_reaction_by_id("5", &emote)
        .unwrap()
        .complete()
        .await
        .unwrap();
    client.channel.pin_message_by_id("5").unwrap().complete().await.unwrap();
    client.channel.clear_reactions_by_id("5").unwrap().complete().await.unwrap();

    let requests = client.api.requests();
    let summary: Vec<_> = requests
        .iter()
        .map(|r| format!("{} {}", r.method, r.path))
        .collect();
    assert_eq!(
        summary,
        vec![
            "PUT channels/10/messages/5/reactions/%F0%9F%91%8D/@me",
            "PUT channels/10/messages/5/reactions/party:42/@me",
            "PUT channels/10/pins/5",
            "DELETE channels/10/messages/5/reactions",
        ]
    );
}

#[tokio::test]
async fn test_pinned_messages() {
    let client = TestClient::start(Permissions::MESSAGE_READ).await.unwrap();
    client.api.respond_with(
        StatusCode::OK,
        Some(json!([message_json(3, CHANNEL, "pinned")])),
    );

    let pinned = client.channel.pinned_messages().unwrap().complete().await.unwrap();
    assert_eq!(pinned.len(), 1);
    assert_eq!(client.api.last_request().unwrap().path, "channels/10/pins");
}

// ============================================================================
// Apply Tests
// ============================================================================

#[tokio::test]
async fn test_apply_redownloads_attachments() {
    let client = TestClient::start(text_permissions()).await.unwrap();
    client.api.serve("kept.png", b"png-bytes".to_vec());
    client
        .api
        .respond_with(StatusCode::OK, Some(message_json(600, CHANNEL, "copy")));

    let mut source = Message::new(Snowflake::new(1), Snowflake::new(99), "copy");
    source.embeds = vec![Embed::new().title("kept"), Embed::new().title("dropped")];
    source.attachments = vec![
        MessageAttachment::new(Snowflake::new(5), "kept.png", client.api.file_url("kept.png"), 9),
        MessageAttachment::new(Snowflake::new(6), "lost.png", client.api.file_url("lost.png"), 9),
    ];

    let mut action = client.channel.send_message_from(&Message::new(
        Snowflake::new(0),
        Snowflake::new(CHANNEL),
        "placeholder",
    ))
    .unwrap();
    action.apply(&source).await;
    assert_eq!(action.attachment_names().collect::<Vec<_>>(), vec!["kept.png"]);

    action.complete().await.unwrap();
    let request = client.api.last_request().unwrap();
    assert_eq!(request.parts.len(), 2);
    assert_eq!(request.part("file0").unwrap().data, b"png-bytes");

    let payload: serde_json::Value =
        serde_json::from_str(request.part("payload_json").unwrap().text().unwrap()).unwrap();
    assert_eq!(payload["content"], "copy");
    assert_eq!(payload["embed"]["title"], "kept");
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[tokio::test]
async fn test_concurrent_sends_share_context() {
    let client = TestClient::start(text_permissions()).await.unwrap();
    for id in 0..5 {
        client
            .api
            .respond_with(StatusCode::OK, Some(message_json(700 + id, CHANNEL, "burst")));
    }

    let actions: Vec<_> = (0..5)
        .map(|n| client.channel.send_message(&format!("burst {n}")).unwrap())
        .collect();
    let results = futures::future::join_all(actions.iter().map(|action| action.complete())).await;

    assert!(results.iter().all(Result::is_ok));
    let mut bodies: Vec<_> = client
        .api
        .requests()
        .iter()
        .filter_map(|r| r.json())
        .map(|body| body["content"].as_str().unwrap_or_default().to_string())
        .collect();
    bodies.sort();
    assert_eq!(
        bodies,
        (0..5).map(|n| format!("burst {n}")).collect::<Vec<_>>()
    );
}
