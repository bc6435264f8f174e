// ABOUTME: Integration tests for the authentication service
// ABOUTME: Classified auth errors, token flows, avatar upload ordering, and account deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

#![allow(missing_docs, clippy::unwrap_used)]

use sqlx::SqlitePool;
use stryde_server::auth::{AuthManager, AuthService, SessionStore};
use stryde_server::database::Database;
use stryde_server::errors::ErrorCode;
use stryde_server::storage::MediaStore;
use tempfile::TempDir;

/// Create a test database with the full schema
async fn create_test_db() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();

    let schema: &[&str] = &[
        r"CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            display_name TEXT,
            password_hash TEXT NOT NULL,
            avatar_url TEXT,
            age INTEGER,
            height_cm REAL,
            weight_kg REAL,
            goal TEXT,
            fitness_level TEXT,
            health_notes TEXT,
            email_verified INTEGER NOT NULL DEFAULT 0,
            onboarding_complete INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            last_active TEXT NOT NULL
        )",
        r"CREATE TABLE IF NOT EXISTS friend_requests (
            from_user TEXT NOT NULL,
            to_user TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (from_user, to_user)
        )",
        r"CREATE TABLE IF NOT EXISTS friendships (
            user_id TEXT NOT NULL,
            friend_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (user_id, friend_id)
        )",
        r"CREATE TABLE IF NOT EXISTS media_posts (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            media_url TEXT NOT NULL,
            caption TEXT,
            like_count INTEGER NOT NULL DEFAULT 0,
            comment_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        r"CREATE TABLE IF NOT EXISTS media_likes (
            post_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (post_id, user_id)
        )",
        r"CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            post_id TEXT NOT NULL,
            author_id TEXT NOT NULL,
            body TEXT NOT NULL,
            like_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        r"CREATE TABLE IF NOT EXISTS comment_likes (
            comment_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (comment_id, user_id)
        )",
        r"CREATE TABLE IF NOT EXISTS replies (
            id TEXT PRIMARY KEY,
            comment_id TEXT NOT NULL,
            author_id TEXT NOT NULL,
            body TEXT NOT NULL,
            like_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        r"CREATE TABLE IF NOT EXISTS reply_likes (
            reply_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (reply_id, user_id)
        )",
        r"CREATE TABLE IF NOT EXISTS chat_messages (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT UNIQUE NOT NULL,
            channel_id TEXT NOT NULL,
            sender_id TEXT NOT NULL,
            recipient_id TEXT NOT NULL,
            body TEXT,
            media_url TEXT,
            created_at TEXT NOT NULL
        )",
        r"CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            note TEXT,
            due_date TEXT,
            completed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        r"CREATE TABLE IF NOT EXISTS email_verification_tokens (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            token_hash TEXT UNIQUE NOT NULL,
            expires_at TEXT NOT NULL,
            used_at TEXT,
            created_at TEXT NOT NULL
        )",
        r"CREATE TABLE IF NOT EXISTS password_reset_tokens (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            token_hash TEXT UNIQUE NOT NULL,
            expires_at TEXT NOT NULL,
            used_at TEXT,
            created_at TEXT NOT NULL
        )",
    ];

    for statement in schema {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }

    pool
}

/// Build an auth service over a fresh database and temp session file
async fn create_service() -> (AuthService, Database, TempDir) {
    let pool = create_test_db().await;
    let db = Database::from_pool(pool);
    let dir = TempDir::new().unwrap();
    let service = AuthService::new(
        db.clone(),
        AuthManager::new("test-secret"),
        SessionStore::new(dir.path().join("session.json")),
    );
    (service, db, dir)
}

#[tokio::test]
async fn register_then_login_roundtrip() {
    let (service, db, _dir) = create_service().await;

    let outcome = service
        .register("alice@example.com", "correct-horse", Some("Alice"))
        .await
        .unwrap();

    let login = service
        .login("alice@example.com", "correct-horse")
        .await
        .unwrap();
    assert_eq!(login.user.id, outcome.user_id);
    assert_eq!(login.user.display_name.as_deref(), Some("Alice"));

    // The session token resolves back to the same account
    let current = service.current_user(&login.token).await.unwrap().unwrap();
    assert_eq!(current.id, outcome.user_id);

    // The local session remembers the user for the next launch
    let session = service.sessions().load().unwrap();
    assert_eq!(session.user_id, Some(outcome.user_id));

    // And the database agrees
    let stored = db.get_user(outcome.user_id).await.unwrap().unwrap();
    assert!(!stored.email_verified);
}

#[tokio::test]
async fn login_failures_are_classified() {
    let (service, _db, _dir) = create_service().await;

    service
        .register("bob@example.com", "password-1", None)
        .await
        .unwrap();

    let err = service
        .login("bob@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthWrongPassword);

    let err = service
        .login("nobody@example.com", "whatever-1")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthUserNotFound);

    let err = service.login("not-an-email", "whatever-1").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthInvalidEmail);
}

#[tokio::test]
async fn registration_failures_are_classified() {
    let (service, _db, _dir) = create_service().await;

    let err = service
        .register("bad-address", "password-1", None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthInvalidEmail);

    let err = service
        .register("carol@example.com", "short", None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    service
        .register("carol@example.com", "password-1", None)
        .await
        .unwrap();
    let err = service
        .register("carol@example.com", "password-2", None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthEmailInUse);
}

#[tokio::test]
async fn verification_token_is_single_use() {
    let (service, db, _dir) = create_service().await;

    let outcome = service
        .register("dave@example.com", "password-1", None)
        .await
        .unwrap();

    let verified = service
        .verify_email(&outcome.verification_token)
        .await
        .unwrap();
    assert_eq!(verified, outcome.user_id);

    let user = db.get_user(outcome.user_id).await.unwrap().unwrap();
    assert!(user.email_verified);

    // Replaying the consumed token fails
    let err = service
        .verify_email(&outcome.verification_token)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn password_reset_flow_invalidates_older_tokens() {
    let (service, _db, _dir) = create_service().await;

    service
        .register("erin@example.com", "original-pass", None)
        .await
        .unwrap();

    let stale = service
        .request_password_reset("erin@example.com")
        .await
        .unwrap();
    let fresh = service
        .request_password_reset("erin@example.com")
        .await
        .unwrap();

    service.reset_password(&fresh, "brand-new-pass").await.unwrap();

    // The old password no longer works, the new one does
    let err = service
        .login("erin@example.com", "original-pass")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthWrongPassword);
    service.login("erin@example.com", "brand-new-pass").await.unwrap();

    // Both the consumed and the leftover token are now dead
    let err = service
        .reset_password(&fresh, "another-pass-1")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    let err = service
        .reset_password(&stale, "another-pass-1")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let err = service
        .request_password_reset("ghost@example.com")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthUserNotFound);
}

#[tokio::test]
async fn change_password_requires_the_current_one() {
    let (service, _db, _dir) = create_service().await;

    let outcome = service
        .register("finn@example.com", "first-pass-1", None)
        .await
        .unwrap();

    let err = service
        .change_password(outcome.user_id, "not-the-pass", "second-pass-1")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthWrongPassword);

    service
        .change_password(outcome.user_id, "first-pass-1", "second-pass-1")
        .await
        .unwrap();
    service.login("finn@example.com", "second-pass-1").await.unwrap();
}

#[tokio::test]
async fn failed_avatar_upload_keeps_the_previous_image() {
    let (service, db, _dir) = create_service().await;

    let blob_dir = TempDir::new().unwrap();
    // A 16-byte cap makes the second upload fail
    let store = MediaStore::new(blob_dir.path().to_path_buf(), 16).await.unwrap();

    let outcome = service
        .register("gina@example.com", "password-1", None)
        .await
        .unwrap();

    let first = service
        .update_avatar(&store, outcome.user_id, b"tiny-image", Some("jpg"))
        .await
        .unwrap();

    let err = service
        .update_avatar(
            &store,
            outcome.user_id,
            &[0u8; 64],
            Some("jpg"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::StorageError);

    // The account still points at the first, successfully stored image
    let user = db.get_user(outcome.user_id).await.unwrap().unwrap();
    assert_eq!(user.avatar_url.as_deref(), Some(first.as_str()));
}

#[tokio::test]
async fn delete_account_cascades_and_clears_the_session() {
    let (service, db, _dir) = create_service().await;

    let outcome = service
        .register("hank@example.com", "password-1", None)
        .await
        .unwrap();
    service.login("hank@example.com", "password-1").await.unwrap();

    let err = service
        .delete_account(outcome.user_id, "wrong-pass")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthWrongPassword);

    service
        .delete_account(outcome.user_id, "password-1")
        .await
        .unwrap();

    assert!(db.get_user(outcome.user_id).await.unwrap().is_none());
    assert_eq!(service.sessions().load().unwrap().user_id, None);
}

#[tokio::test]
async fn invalid_session_tokens_resolve_to_no_user() {
    let (service, _db, _dir) = create_service().await;

    assert!(service.current_user("garbage").await.unwrap().is_none());
}

#[tokio::test]
async fn sign_out_clears_the_local_session() {
    let (service, _db, _dir) = create_service().await;

    service
        .register("iris@example.com", "password-1", None)
        .await
        .unwrap();
    service.login("iris@example.com", "password-1").await.unwrap();
    assert!(service.sessions().load().unwrap().user_id.is_some());

    service.sign_out().unwrap();
    assert_eq!(service.sessions().load().unwrap().user_id, None);
}
