// ABOUTME: Direct message storage with deterministic two-party channel addressing
// ABOUTME: Messages are append-only and ordered newest-first for display
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use std::sync::Arc;

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::ChatMessage;
use crate::sync::{ChangeKind, ListenerHub, Subscription};

/// Derive the channel key shared by two participants
///
/// The smaller identifier (by total order) always comes first, so both
/// participants compute the same key independently without a lookup table.
#[must_use]
pub fn channel_id(a: Uuid, b: Uuid) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{lo}-{hi}")
}

/// Chat database operations manager
pub struct ChatManager {
    pool: SqlitePool,
    hub: Arc<ListenerHub>,
}

impl ChatManager {
    /// Create a new chat manager
    #[must_use]
    pub const fn new(pool: SqlitePool, hub: Arc<ListenerHub>) -> Self {
        Self { pool, hub }
    }

    /// Append a message to the sender/recipient channel
    ///
    /// The creation timestamp is server-assigned and the message is immutable
    /// afterwards; append is the only mutation the channel supports.
    ///
    /// # Errors
    ///
    /// Returns an error if both body and media are absent, or the insert
    /// fails.
    pub async fn send_message(
        &self,
        sender: Uuid,
        recipient: Uuid,
        body: Option<&str>,
        media_url: Option<&str>,
    ) -> AppResult<ChatMessage> {
        if body.map_or(true, str::is_empty) && media_url.is_none() {
            return Err(AppError::invalid_input("Message has no body or media"));
        }

        let id = Uuid::new_v4().to_string();
        let channel = channel_id(sender, recipient);
        let now = chrono::Utc::now();

        let row = sqlx::query(
            r"
            INSERT INTO chat_messages (id, channel_id, sender_id, recipient_id, body, media_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING seq
            ",
        )
        .bind(&id)
        .bind(&channel)
        .bind(sender.to_string())
        .bind(recipient.to_string())
        .bind(body)
        .bind(media_url)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to send message: {e}")))?;

        let message = ChatMessage {
            id,
            channel_id: channel.clone(),
            sender_id: sender,
            recipient_id: recipient,
            body: body.map(ToOwned::to_owned),
            media_url: media_url.map(ToOwned::to_owned),
            created_at: now,
            seq: row.get("seq"),
        };

        self.hub.publish(
            &Self::topic(&channel),
            ChangeKind::Created,
            serde_json::to_value(&message)?,
        );

        Ok(message)
    }

    /// Messages in a channel, newest first
    ///
    /// The insertion sequence breaks creation-timestamp ties, so two messages
    /// sent back-to-back by the same sender keep their relative order for
    /// every reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn messages(&self, channel: &str, limit: i64) -> AppResult<Vec<ChatMessage>> {
        let rows = sqlx::query(
            r"
            SELECT seq, id, channel_id, sender_id, recipient_id, body, media_url, created_at
            FROM chat_messages
            WHERE channel_id = $1
            ORDER BY created_at DESC, seq DESC
            LIMIT $2
            ",
        )
        .bind(channel)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get messages: {e}")))?;

        rows.iter().map(Self::row_to_message).collect()
    }

    /// Subscribe to live changes on a channel
    ///
    /// The returned handle must be released when the conversation view goes
    /// away; see [`Subscription`].
    #[must_use]
    pub fn subscribe(&self, channel: &str) -> Subscription {
        self.hub.subscribe(&Self::topic(channel))
    }

    fn topic(channel: &str) -> String {
        format!("chats/{channel}")
    }

    fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> AppResult<ChatMessage> {
        let sender: String = row.get("sender_id");
        let recipient: String = row.get("recipient_id");

        Ok(ChatMessage {
            id: row.get("id"),
            channel_id: row.get("channel_id"),
            sender_id: Uuid::parse_str(&sender)
                .map_err(|e| AppError::internal(format!("Failed to parse sender UUID: {e}")))?,
            recipient_id: Uuid::parse_str(&recipient)
                .map_err(|e| AppError::internal(format!("Failed to parse recipient UUID: {e}")))?,
            body: row.get("body"),
            media_url: row.get("media_url"),
            created_at: row.get("created_at"),
            seq: row.get("seq"),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn channel_id_is_commutative() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(channel_id(a, b), channel_id(b, a));
    }

    #[test]
    fn channel_id_orders_smaller_first() {
        let a = Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap();
        let b = Uuid::parse_str("00000000-0000-0000-0000-000000000002").unwrap();
        assert_eq!(channel_id(b, a), format!("{a}-{b}"));
    }

    #[test]
    fn channel_id_with_self_is_stable() {
        let a = Uuid::new_v4();
        assert_eq!(channel_id(a, a), format!("{a}-{a}"));
    }
}
