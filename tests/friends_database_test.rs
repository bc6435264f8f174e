// ABOUTME: Integration tests for the friend relationship state model
// ABOUTME: Covers request/accept/reject transitions, symmetry, and the candidate exclusion query
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

#![allow(missing_docs, clippy::unwrap_used)]

use std::sync::Arc;

use sqlx::SqlitePool;
use stryde_server::database::FriendManager;
use stryde_server::errors::ErrorCode;
use stryde_server::models::FriendshipState;
use stryde_server::sync::ListenerHub;
use uuid::Uuid;

/// Create a test database with the relationship schema and three users
async fn create_test_db() -> (SqlitePool, Uuid, Uuid, Uuid) {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            display_name TEXT,
            password_hash TEXT NOT NULL,
            avatar_url TEXT,
            created_at TEXT NOT NULL,
            last_active TEXT NOT NULL
        )
        ",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS friend_requests (
            from_user TEXT NOT NULL,
            to_user TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (from_user, to_user)
        )
        ",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS friendships (
            user_id TEXT NOT NULL,
            friend_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (user_id, friend_id)
        )
        ",
    )
    .execute(&pool)
    .await
    .unwrap();

    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let carol = Uuid::new_v4();

    for (id, name) in [(alice, "alice"), (bob, "bob"), (carol, "carol")] {
        sqlx::query(
            r"
            INSERT INTO users (id, email, display_name, password_hash, created_at, last_active)
            VALUES ($1, $2, $3, 'hash', '2025-01-01T00:00:00+00:00', '2025-01-01T00:00:00+00:00')
            ",
        )
        .bind(id.to_string())
        .bind(format!("{name}@example.com"))
        .bind(name)
        .execute(&pool)
        .await
        .unwrap();
    }

    (pool, alice, bob, carol)
}

fn manager(pool: SqlitePool) -> (FriendManager, Arc<ListenerHub>) {
    let hub = Arc::new(ListenerHub::new());
    (FriendManager::new(pool, Arc::clone(&hub)), hub)
}

#[tokio::test]
async fn send_then_accept_confirms_both_sides() {
    let (pool, alice, bob, _) = create_test_db().await;
    let (friends, _hub) = manager(pool);

    friends.send_request(alice, bob).await.unwrap();
    let incoming = friends.list_incoming(bob).await.unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].id, alice);

    friends.accept_request(bob, alice).await.unwrap();

    let alice_friends = friends.list_friends(alice).await.unwrap();
    let bob_friends = friends.list_friends(bob).await.unwrap();
    assert_eq!(alice_friends.len(), 1);
    assert_eq!(alice_friends[0].id, bob);
    assert_eq!(bob_friends.len(), 1);
    assert_eq!(bob_friends[0].id, alice);

    // The pending request is consumed by the accept
    assert!(friends.list_incoming(bob).await.unwrap().is_empty());
    assert_eq!(
        friends.relationship(alice, bob).await.unwrap(),
        FriendshipState::Confirmed
    );
    assert_eq!(
        friends.relationship(bob, alice).await.unwrap(),
        FriendshipState::Confirmed
    );
}

#[tokio::test]
async fn reject_removes_request_and_changes_no_friendships() {
    let (pool, alice, bob, _) = create_test_db().await;
    let (friends, _hub) = manager(pool);

    friends.send_request(alice, bob).await.unwrap();
    let removed = friends.reject_request(bob, alice).await.unwrap();
    assert!(removed);

    assert!(friends.list_incoming(bob).await.unwrap().is_empty());
    assert!(friends.list_friends(alice).await.unwrap().is_empty());
    assert!(friends.list_friends(bob).await.unwrap().is_empty());

    // The requester may immediately re-request
    friends.send_request(alice, bob).await.unwrap();
    assert_eq!(friends.list_incoming(bob).await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_request_is_idempotent() {
    let (pool, alice, bob, _) = create_test_db().await;
    let (friends, _hub) = manager(pool);

    friends.send_request(alice, bob).await.unwrap();
    friends.send_request(alice, bob).await.unwrap();

    assert_eq!(friends.list_incoming(bob).await.unwrap().len(), 1);
}

#[tokio::test]
async fn self_request_is_rejected() {
    let (pool, alice, _, _) = create_test_db().await;
    let (friends, _hub) = manager(pool);

    let err = friends.send_request(alice, alice).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn request_to_confirmed_friend_is_rejected() {
    let (pool, alice, bob, _) = create_test_db().await;
    let (friends, _hub) = manager(pool);

    friends.send_request(alice, bob).await.unwrap();
    friends.accept_request(bob, alice).await.unwrap();

    let err = friends.send_request(alice, bob).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    let err = friends.send_request(bob, alice).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn accept_without_pending_request_fails() {
    let (pool, alice, bob, _) = create_test_db().await;
    let (friends, _hub) = manager(pool);

    let err = friends.accept_request(bob, alice).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    assert!(friends.list_friends(bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn withdraw_returns_relationship_to_unrelated() {
    let (pool, alice, bob, _) = create_test_db().await;
    let (friends, _hub) = manager(pool);

    friends.send_request(alice, bob).await.unwrap();
    assert_eq!(
        friends.relationship(alice, bob).await.unwrap(),
        FriendshipState::RequestedOutgoing
    );
    assert_eq!(
        friends.relationship(bob, alice).await.unwrap(),
        FriendshipState::RequestedIncoming
    );

    let removed = friends.withdraw_request(alice, bob).await.unwrap();
    assert!(removed);
    assert_eq!(
        friends.relationship(alice, bob).await.unwrap(),
        FriendshipState::Unrelated
    );
}

#[tokio::test]
async fn candidates_exclude_self_and_confirmed_friends() {
    let (pool, alice, bob, carol) = create_test_db().await;
    let (friends, _hub) = manager(pool);

    friends.send_request(alice, bob).await.unwrap();
    friends.accept_request(bob, alice).await.unwrap();

    let candidates = friends.list_candidates(alice).await.unwrap();
    let ids: Vec<Uuid> = candidates.iter().map(|p| p.id).collect();

    assert!(!ids.contains(&alice));
    assert!(!ids.contains(&bob));
    assert!(ids.contains(&carol));

    // A pending counterparty stays in the candidate list
    friends.send_request(alice, carol).await.unwrap();
    let candidates = friends.list_candidates(alice).await.unwrap();
    assert!(candidates.iter().any(|p| p.id == carol));
}

#[tokio::test]
async fn accept_publishes_to_both_user_topics() {
    let (pool, alice, bob, _) = create_test_db().await;
    let (friends, hub) = manager(pool);

    let mut alice_sub = hub.subscribe(&format!("users/{alice}"));
    let mut bob_sub = hub.subscribe(&format!("users/{bob}"));

    friends.send_request(alice, bob).await.unwrap();
    // The pending notification goes to the recipient only
    assert!(bob_sub.try_recv().is_some());
    assert!(alice_sub.try_recv().is_none());

    friends.accept_request(bob, alice).await.unwrap();
    assert!(alice_sub.try_recv().is_some());
    assert!(bob_sub.try_recv().is_some());
}
