// ABOUTME: Friend relationship state model: pending requests and confirmed friendships
// ABOUTME: The accept transition performs its symmetric dual write inside a single transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

//! Friend relationship lifecycle
//!
//! A relationship between two users moves through three states:
//! `unrelated` -> `requested` (one-directional, pending on the recipient) ->
//! `confirmed` (mutual), or back to `unrelated` on reject/withdraw. Confirmed
//! friendship is symmetric and stored as a pair of rows written in one
//! transaction, so a crash between the two sides cannot leave an asymmetric
//! relationship. No rejection record is kept; a rejected requester may
//! immediately re-request.

use std::sync::Arc;

use serde_json::json;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{FriendshipState, PublicProfile};
use crate::sync::{ChangeKind, ListenerHub};

/// Friend relationship database operations
pub struct FriendManager {
    pool: SqlitePool,
    hub: Arc<ListenerHub>,
}

impl FriendManager {
    /// Create a new friend manager
    #[must_use]
    pub const fn new(pool: SqlitePool, hub: Arc<ListenerHub>) -> Self {
        Self { pool, hub }
    }

    /// Send a friend request from `from` to `to`
    ///
    /// Idempotent: a request that is already pending is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if `from == to`, the two users are already confirmed
    /// friends, or the database operation fails.
    pub async fn send_request(&self, from: Uuid, to: Uuid) -> AppResult<()> {
        if from == to {
            return Err(AppError::invalid_input(
                "Cannot send a friend request to yourself",
            ));
        }

        if self.are_friends(from, to).await? {
            return Err(AppError::invalid_input("Users are already friends"));
        }

        sqlx::query(
            r"
            INSERT OR IGNORE INTO friend_requests (from_user, to_user, created_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(from.to_string())
        .bind(to.to_string())
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to send friend request: {e}")))?;

        self.hub.publish(
            &format!("users/{to}"),
            ChangeKind::Updated,
            json!({ "pending_incoming_added": from }),
        );

        Ok(())
    }

    /// Accept a pending friend request
    ///
    /// Removes the pending row and inserts both symmetric friendship rows in
    /// one transaction, so the dual write either fully applies or not at all.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no request from `requester` is pending on
    /// `self_id`, or a database error if the transaction fails.
    pub async fn accept_request(&self, self_id: Uuid, requester: Uuid) -> AppResult<()> {
        let now = chrono::Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let removed = sqlx::query(
            "DELETE FROM friend_requests WHERE from_user = $1 AND to_user = $2",
        )
        .bind(requester.to_string())
        .bind(self_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to consume friend request: {e}")))?;

        if removed.rows_affected() == 0 {
            return Err(AppError::not_found("No pending friend request"));
        }

        sqlx::query(
            r"
            INSERT OR IGNORE INTO friendships (user_id, friend_id, created_at)
            VALUES ($1, $2, $3), ($2, $1, $3)
            ",
        )
        .bind(self_id.to_string())
        .bind(requester.to_string())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to record friendship: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit friendship: {e}")))?;

        for (subject, counterparty) in [(self_id, requester), (requester, self_id)] {
            self.hub.publish(
                &format!("users/{subject}"),
                ChangeKind::Updated,
                json!({ "friend_confirmed": counterparty }),
            );
        }

        Ok(())
    }

    /// Reject a pending friend request
    ///
    /// Removes the pending row only; neither user's friendships change and no
    /// record of the rejection is retained. Returns whether a request was
    /// actually pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn reject_request(&self, self_id: Uuid, requester: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM friend_requests WHERE from_user = $1 AND to_user = $2",
        )
        .bind(requester.to_string())
        .bind(self_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to reject friend request: {e}")))?;

        let removed = result.rows_affected() > 0;
        if removed {
            self.hub.publish(
                &format!("users/{self_id}"),
                ChangeKind::Updated,
                json!({ "pending_incoming_removed": requester }),
            );
        }

        Ok(removed)
    }

    /// Withdraw a request the sender no longer wants to make
    ///
    /// Same row deletion as a reject, issued from the requester's side.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn withdraw_request(&self, from: Uuid, to: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM friend_requests WHERE from_user = $1 AND to_user = $2",
        )
        .bind(from.to_string())
        .bind(to.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to withdraw friend request: {e}")))?;

        let removed = result.rows_affected() > 0;
        if removed {
            self.hub.publish(
                &format!("users/{to}"),
                ChangeKind::Updated,
                json!({ "pending_incoming_removed": from }),
            );
        }

        Ok(removed)
    }

    /// Relationship between two users, from `subject`'s perspective
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails
    pub async fn relationship(&self, subject: Uuid, other: Uuid) -> AppResult<FriendshipState> {
        if self.are_friends(subject, other).await? {
            return Ok(FriendshipState::Confirmed);
        }

        if self.request_pending(subject, other).await? {
            return Ok(FriendshipState::RequestedOutgoing);
        }

        if self.request_pending(other, subject).await? {
            return Ok(FriendshipState::RequestedIncoming);
        }

        Ok(FriendshipState::Unrelated)
    }

    /// Users whose requests are pending on `self_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_incoming(&self, self_id: Uuid) -> AppResult<Vec<PublicProfile>> {
        let rows = sqlx::query(
            r"
            SELECT u.id, u.display_name, u.avatar_url
            FROM friend_requests fr
            JOIN users u ON u.id = fr.from_user
            WHERE fr.to_user = $1
            ORDER BY fr.created_at ASC
            ",
        )
        .bind(self_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list incoming requests: {e}")))?;

        rows.iter().map(Self::row_to_profile).collect()
    }

    /// Confirmed friends of `self_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_friends(&self, self_id: Uuid) -> AppResult<Vec<PublicProfile>> {
        let rows = sqlx::query(
            r"
            SELECT u.id, u.display_name, u.avatar_url
            FROM friendships f
            JOIN users u ON u.id = f.friend_id
            WHERE f.user_id = $1
            ORDER BY f.created_at ASC
            ",
        )
        .bind(self_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list friends: {e}")))?;

        rows.iter().map(Self::row_to_profile).collect()
    }

    /// Users shown on the explore surface: everyone except `self_id` and
    /// their confirmed friends
    ///
    /// Pending counterparties stay in the list; only confirmation removes a
    /// user from the candidates.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_candidates(&self, self_id: Uuid) -> AppResult<Vec<PublicProfile>> {
        let rows = sqlx::query(
            r"
            SELECT u.id, u.display_name, u.avatar_url
            FROM users u
            WHERE u.id != $1
              AND u.id NOT IN (SELECT friend_id FROM friendships WHERE user_id = $1)
            ORDER BY u.created_at ASC
            ",
        )
        .bind(self_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list candidates: {e}")))?;

        rows.iter().map(Self::row_to_profile).collect()
    }

    async fn are_friends(&self, a: Uuid, b: Uuid) -> AppResult<bool> {
        let row = sqlx::query(
            "SELECT 1 FROM friendships WHERE user_id = $1 AND friend_id = $2",
        )
        .bind(a.to_string())
        .bind(b.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check friendship: {e}")))?;

        Ok(row.is_some())
    }

    async fn request_pending(&self, from: Uuid, to: Uuid) -> AppResult<bool> {
        let row = sqlx::query(
            "SELECT 1 FROM friend_requests WHERE from_user = $1 AND to_user = $2",
        )
        .bind(from.to_string())
        .bind(to.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check pending request: {e}")))?;

        Ok(row.is_some())
    }

    fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> AppResult<PublicProfile> {
        let id: String = row.get("id");
        Ok(PublicProfile {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::internal(format!("Failed to parse user id UUID: {e}")))?,
            display_name: row.get("display_name"),
            avatar_url: row.get("avatar_url"),
        })
    }
}
