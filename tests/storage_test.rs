// ABOUTME: Integration tests for the blob media store
// ABOUTME: Round-trips, size caps, traversal rejection, and URI mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

#![allow(missing_docs, clippy::unwrap_used)]

use stryde_server::errors::ErrorCode;
use stryde_server::storage::MediaStore;
use tempfile::TempDir;

async fn create_store(max_bytes: usize) -> (MediaStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = MediaStore::new(dir.path().to_path_buf(), max_bytes)
        .await
        .unwrap();
    (store, dir)
}

#[tokio::test]
async fn store_and_load_roundtrip() {
    let (store, _dir) = create_store(1024).await;

    let uri = store.store(b"jpeg bytes", Some("jpg")).await.unwrap();
    assert!(uri.starts_with("/media/"));
    assert!(uri.ends_with(".jpg"));

    let name = MediaStore::blob_name(&uri).unwrap();
    let data = store.load(name).await.unwrap();
    assert_eq!(data, b"jpeg bytes");
}

#[tokio::test]
async fn uris_are_stable_and_unique() {
    let (store, _dir) = create_store(1024).await;

    let first = store.store(b"one", None).await.unwrap();
    let second = store.store(b"one", None).await.unwrap();
    assert_ne!(first, second);

    // The first URI still resolves after more writes
    let name = MediaStore::blob_name(&first).unwrap();
    assert_eq!(store.load(name).await.unwrap(), b"one");
}

#[tokio::test]
async fn empty_and_oversized_uploads_are_rejected() {
    let (store, _dir) = create_store(8).await;

    let err = store.store(b"", None).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = store.store(&[0u8; 9], None).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::StorageError);
}

#[tokio::test]
async fn traversal_names_are_rejected() {
    let (store, _dir) = create_store(1024).await;

    for name in ["../secret", "a/b", "..", ""] {
        let err = store.load(name).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput, "accepted {name:?}");
    }
}

#[tokio::test]
async fn missing_blob_is_not_found_and_delete_is_idempotent() {
    let (store, _dir) = create_store(1024).await;

    let err = store.load("missing.jpg").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    // Deleting a missing blob is a no-op
    store.delete("missing.jpg").await.unwrap();

    let uri = store.store(b"bytes", None).await.unwrap();
    let name = MediaStore::blob_name(&uri).unwrap().to_owned();
    store.delete(&name).await.unwrap();
    let err = store.load(&name).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}
