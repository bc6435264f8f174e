// ABOUTME: Integration tests for the chat database module
// ABOUTME: Channel addressing commutativity, append ordering, and live subscriptions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

#![allow(missing_docs, clippy::unwrap_used)]

use std::sync::Arc;

use sqlx::SqlitePool;
use stryde_server::database::{channel_id, ChatManager};
use stryde_server::errors::ErrorCode;
use stryde_server::sync::ListenerHub;
use uuid::Uuid;

/// Create a test database with the chat schema
async fn create_test_db() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS chat_messages (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT UNIQUE NOT NULL,
            channel_id TEXT NOT NULL,
            sender_id TEXT NOT NULL,
            recipient_id TEXT NOT NULL,
            body TEXT,
            media_url TEXT,
            created_at TEXT NOT NULL
        )
        ",
    )
    .execute(&pool)
    .await
    .unwrap();

    pool
}

fn manager(pool: SqlitePool) -> (ChatManager, Arc<ListenerHub>) {
    let hub = Arc::new(ListenerHub::new());
    (ChatManager::new(pool, Arc::clone(&hub)), hub)
}

#[tokio::test]
async fn both_participants_compute_the_same_channel() {
    let pool = create_test_db().await;
    let (chat, _hub) = manager(pool);

    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    chat.send_message(alice, bob, Some("hello"), None)
        .await
        .unwrap();

    // Reading through the channel derived in either direction sees the message
    let from_alice = chat.messages(&channel_id(alice, bob), 10).await.unwrap();
    let from_bob = chat.messages(&channel_id(bob, alice), 10).await.unwrap();

    assert_eq!(from_alice.len(), 1);
    assert_eq!(from_bob.len(), 1);
    assert_eq!(from_alice[0].id, from_bob[0].id);
}

#[tokio::test]
async fn sequential_messages_keep_their_relative_order() {
    let pool = create_test_db().await;
    let (chat, _hub) = manager(pool);

    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let first = chat
        .send_message(alice, bob, Some("first"), None)
        .await
        .unwrap();
    let second = chat
        .send_message(alice, bob, Some("second"), None)
        .await
        .unwrap();

    // Newest first, even when the creation timestamps tie
    let messages = chat.messages(&first.channel_id, 10).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].id, second.id);
    assert_eq!(messages[1].id, first.id);
    assert!(messages[0].seq > messages[1].seq);
}

#[tokio::test]
async fn interleaved_senders_share_one_ordered_channel() {
    let pool = create_test_db().await;
    let (chat, _hub) = manager(pool);

    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    chat.send_message(alice, bob, Some("hi"), None).await.unwrap();
    chat.send_message(bob, alice, Some("hey"), None).await.unwrap();
    chat.send_message(alice, bob, Some("how are you"), None)
        .await
        .unwrap();

    let messages = chat.messages(&channel_id(alice, bob), 10).await.unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].body.as_deref(), Some("how are you"));
    assert_eq!(messages[2].body.as_deref(), Some("hi"));
}

#[tokio::test]
async fn message_without_body_or_media_is_rejected() {
    let pool = create_test_db().await;
    let (chat, _hub) = manager(pool);

    let err = chat
        .send_message(Uuid::new_v4(), Uuid::new_v4(), None, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = chat
        .send_message(Uuid::new_v4(), Uuid::new_v4(), Some(""), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn media_message_needs_no_body() {
    let pool = create_test_db().await;
    let (chat, _hub) = manager(pool);

    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let message = chat
        .send_message(alice, bob, None, Some("/media/photo.jpg"))
        .await
        .unwrap();
    assert!(message.body.is_none());
    assert_eq!(message.media_url.as_deref(), Some("/media/photo.jpg"));
}

#[tokio::test]
async fn subscription_receives_appended_messages() {
    let pool = create_test_db().await;
    let (chat, _hub) = manager(pool);

    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let channel = channel_id(alice, bob);

    let mut sub = chat.subscribe(&channel);
    chat.send_message(alice, bob, Some("ping"), None)
        .await
        .unwrap();

    let event = sub.recv().await.unwrap();
    assert_eq!(event.topic, format!("chats/{channel}"));
    assert_eq!(event.document["body"], "ping");

    // Cancelled subscriptions stop receiving
    sub.cancel();
    chat.send_message(alice, bob, Some("pong"), None)
        .await
        .unwrap();
}

#[tokio::test]
async fn limit_caps_the_returned_page() {
    let pool = create_test_db().await;
    let (chat, _hub) = manager(pool);

    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    for i in 0..5 {
        chat.send_message(alice, bob, Some(&format!("m{i}")), None)
            .await
            .unwrap();
    }

    let page = chat.messages(&channel_id(alice, bob), 3).await.unwrap();
    assert_eq!(page.len(), 3);
    assert_eq!(page[0].body.as_deref(), Some("m4"));
}
