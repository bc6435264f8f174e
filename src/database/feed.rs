// ABOUTME: Media feed storage: posts, like votes, comments, and one-level replies
// ABOUTME: Counter updates ride the same transaction as their vote or comment row
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

//! Feed interaction counters
//!
//! Like state is a vote row keyed (content, user) with the denormalized
//! counter adjusted in the same transaction. The primary key on the vote
//! table enforces one vote per user per content item, so a rapid double
//! toggle can never desynchronize the counter from the membership set.
//! Replies count as equal units in the owning post's comment counter.

use std::sync::Arc;

use serde_json::json;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{Comment, CommentThread, MediaPost, Reply};
use crate::sync::{ChangeKind, ListenerHub};

/// Result of a like toggle
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct LikeOutcome {
    /// Whether the user's vote now exists
    pub liked: bool,
    /// Counter value after the toggle
    pub like_count: i64,
}

/// Feed database operations manager
pub struct FeedManager {
    pool: SqlitePool,
    hub: Arc<ListenerHub>,
}

impl FeedManager {
    /// Create a new feed manager
    #[must_use]
    pub const fn new(pool: SqlitePool, hub: Arc<ListenerHub>) -> Self {
        Self { pool, hub }
    }

    // ========================================================================
    // Posts
    // ========================================================================

    /// Create a media post
    ///
    /// # Errors
    ///
    /// Returns an error if the media URI is empty or the insert fails
    pub async fn create_post(
        &self,
        owner: Uuid,
        media_url: &str,
        caption: Option<&str>,
    ) -> AppResult<MediaPost> {
        if media_url.is_empty() {
            return Err(AppError::invalid_input("Post has no media"));
        }

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now();

        sqlx::query(
            r"
            INSERT INTO media_posts (id, owner_id, media_url, caption, like_count, comment_count, created_at)
            VALUES ($1, $2, $3, $4, 0, 0, $5)
            ",
        )
        .bind(&id)
        .bind(owner.to_string())
        .bind(media_url)
        .bind(caption)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create post: {e}")))?;

        let post = MediaPost {
            id,
            owner_id: owner,
            media_url: media_url.to_owned(),
            caption: caption.map(ToOwned::to_owned),
            like_count: 0,
            comment_count: 0,
            created_at: now,
        };

        self.hub.publish(
            "media",
            ChangeKind::Created,
            serde_json::to_value(&post)?,
        );

        Ok(post)
    }

    /// Get a post by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_post(&self, post_id: &str) -> AppResult<Option<MediaPost>> {
        let row = sqlx::query(
            r"
            SELECT id, owner_id, media_url, caption, like_count, comment_count, created_at
            FROM media_posts
            WHERE id = $1
            ",
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get post: {e}")))?;

        row.map(|r| Self::row_to_post(&r)).transpose()
    }

    /// Other users' posts, newest first
    ///
    /// The viewer's own posts are excluded, matching the people-feed query.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_feed(&self, viewer: Uuid, limit: i64) -> AppResult<Vec<MediaPost>> {
        let rows = sqlx::query(
            r"
            SELECT id, owner_id, media_url, caption, like_count, comment_count, created_at
            FROM media_posts
            WHERE owner_id != $1
            ORDER BY created_at DESC
            LIMIT $2
            ",
        )
        .bind(viewer.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list feed: {e}")))?;

        rows.iter().map(Self::row_to_post).collect()
    }

    /// One user's posts, newest first (profile grid)
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_user_posts(&self, owner: Uuid) -> AppResult<Vec<MediaPost>> {
        let rows = sqlx::query(
            r"
            SELECT id, owner_id, media_url, caption, like_count, comment_count, created_at
            FROM media_posts
            WHERE owner_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list user posts: {e}")))?;

        rows.iter().map(Self::row_to_post).collect()
    }

    /// Update a post's caption; owner only
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn update_caption(
        &self,
        post_id: &str,
        owner: Uuid,
        caption: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE media_posts SET caption = $1 WHERE id = $2 AND owner_id = $3",
        )
        .bind(caption)
        .bind(post_id)
        .bind(owner.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update caption: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a post with its comments, replies, and votes
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` if the caller does not own the post, or a
    /// database error if the transaction fails. Returns `Ok(false)` when the
    /// post does not exist.
    pub async fn delete_post(&self, post_id: &str, caller: Uuid) -> AppResult<bool> {
        let Some(post) = self.get_post(post_id).await? else {
            return Ok(false);
        };
        if post.owner_id != caller {
            return Err(AppError::permission_denied("Only the owner can delete a post"));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let statements: &[&str] = &[
            r"DELETE FROM reply_likes WHERE reply_id IN (
                SELECT r.id FROM replies r
                JOIN comments c ON r.comment_id = c.id
                WHERE c.post_id = $1
            )",
            "DELETE FROM replies WHERE comment_id IN (SELECT id FROM comments WHERE post_id = $1)",
            "DELETE FROM comment_likes WHERE comment_id IN (SELECT id FROM comments WHERE post_id = $1)",
            "DELETE FROM comments WHERE post_id = $1",
            "DELETE FROM media_likes WHERE post_id = $1",
            "DELETE FROM media_posts WHERE id = $1",
        ];

        for statement in statements {
            sqlx::query(statement)
                .bind(post_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to delete post: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit post deletion: {e}")))?;

        self.hub.publish(
            &format!("media/{post_id}"),
            ChangeKind::Deleted,
            json!({ "id": post_id }),
        );

        Ok(true)
    }

    // ========================================================================
    // Likes
    // ========================================================================

    /// Toggle the user's like on a post
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the post does not exist, or a database
    /// error if the transaction fails.
    pub async fn toggle_like(&self, post_id: &str, user: Uuid) -> AppResult<LikeOutcome> {
        let outcome = self
            .toggle_vote("media_posts", "media_likes", "post_id", post_id, user)
            .await?;

        self.hub.publish(
            &format!("media/{post_id}"),
            ChangeKind::Updated,
            json!({ "id": post_id, "like_count": outcome.like_count, "liked_by": user, "liked": outcome.liked }),
        );

        Ok(outcome)
    }

    /// Toggle the user's like on a comment
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the comment does not exist, or a database
    /// error if the transaction fails.
    pub async fn toggle_comment_like(
        &self,
        comment_id: &str,
        user: Uuid,
    ) -> AppResult<LikeOutcome> {
        self.toggle_vote("comments", "comment_likes", "comment_id", comment_id, user)
            .await
    }

    /// Toggle the user's like on a reply
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the reply does not exist, or a database
    /// error if the transaction fails.
    pub async fn toggle_reply_like(&self, reply_id: &str, user: Uuid) -> AppResult<LikeOutcome> {
        self.toggle_vote("replies", "reply_likes", "reply_id", reply_id, user)
            .await
    }

    /// Shared vote-toggle transaction over (entity table, vote table)
    async fn toggle_vote(
        &self,
        entity_table: &str,
        vote_table: &str,
        fk_column: &str,
        entity_id: &str,
        user: Uuid,
    ) -> AppResult<LikeOutcome> {
        let uid = user.to_string();
        let now = chrono::Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let removed = sqlx::query(&format!(
            "DELETE FROM {vote_table} WHERE {fk_column} = $1 AND user_id = $2"
        ))
        .bind(entity_id)
        .bind(&uid)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to toggle vote: {e}")))?;

        let liked = removed.rows_affected() == 0;

        if liked {
            let bumped = sqlx::query(&format!(
                "UPDATE {entity_table} SET like_count = like_count + 1 WHERE id = $1"
            ))
            .bind(entity_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to update like count: {e}")))?;

            if bumped.rows_affected() == 0 {
                return Err(AppError::not_found("Content no longer exists"));
            }

            sqlx::query(&format!(
                "INSERT INTO {vote_table} ({fk_column}, user_id, created_at) VALUES ($1, $2, $3)"
            ))
            .bind(entity_id)
            .bind(&uid)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to record vote: {e}")))?;
        } else {
            sqlx::query(&format!(
                "UPDATE {entity_table} SET like_count = like_count - 1 WHERE id = $1"
            ))
            .bind(entity_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to update like count: {e}")))?;
        }

        let row = sqlx::query(&format!(
            "SELECT like_count FROM {entity_table} WHERE id = $1"
        ))
        .bind(entity_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to read like count: {e}")))?;

        let Some(row) = row else {
            return Err(AppError::not_found("Content no longer exists"));
        };

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit vote: {e}")))?;

        Ok(LikeOutcome {
            liked,
            like_count: row.get("like_count"),
        })
    }

    // ========================================================================
    // Comments and replies
    // ========================================================================

    /// Append a comment and bump the post's comment counter in one transaction
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the post does not exist, or a database
    /// error if the transaction fails.
    pub async fn add_comment(
        &self,
        post_id: &str,
        author: Uuid,
        body: &str,
    ) -> AppResult<Comment> {
        if body.trim().is_empty() {
            return Err(AppError::invalid_input("Comment is empty"));
        }

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let bumped = sqlx::query(
            "UPDATE media_posts SET comment_count = comment_count + 1 WHERE id = $1",
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update comment count: {e}")))?;

        if bumped.rows_affected() == 0 {
            return Err(AppError::not_found("Post"));
        }

        sqlx::query(
            r"
            INSERT INTO comments (id, post_id, author_id, body, like_count, created_at)
            VALUES ($1, $2, $3, $4, 0, $5)
            ",
        )
        .bind(&id)
        .bind(post_id)
        .bind(author.to_string())
        .bind(body)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to add comment: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit comment: {e}")))?;

        let comment = Comment {
            id,
            post_id: post_id.to_owned(),
            author_id: author,
            body: body.to_owned(),
            like_count: 0,
            created_at: now,
        };

        self.hub.publish(
            &format!("media/{post_id}"),
            ChangeKind::Updated,
            serde_json::to_value(&comment)?,
        );

        Ok(comment)
    }

    /// Append a reply under a comment; counts as a unit in the post counter
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the comment does not exist, or a database
    /// error if the transaction fails.
    pub async fn add_reply(
        &self,
        comment_id: &str,
        author: Uuid,
        body: &str,
    ) -> AppResult<Reply> {
        if body.trim().is_empty() {
            return Err(AppError::invalid_input("Reply is empty"));
        }

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let row = sqlx::query("SELECT post_id FROM comments WHERE id = $1")
            .bind(comment_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to resolve comment: {e}")))?;

        let Some(row) = row else {
            return Err(AppError::not_found("Comment"));
        };
        let post_id: String = row.get("post_id");

        sqlx::query(
            "UPDATE media_posts SET comment_count = comment_count + 1 WHERE id = $1",
        )
        .bind(&post_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update comment count: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO replies (id, comment_id, author_id, body, like_count, created_at)
            VALUES ($1, $2, $3, $4, 0, $5)
            ",
        )
        .bind(&id)
        .bind(comment_id)
        .bind(author.to_string())
        .bind(body)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to add reply: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit reply: {e}")))?;

        let reply = Reply {
            id,
            comment_id: comment_id.to_owned(),
            author_id: author,
            body: body.to_owned(),
            like_count: 0,
            created_at: now,
        };

        self.hub.publish(
            &format!("media/{post_id}"),
            ChangeKind::Updated,
            serde_json::to_value(&reply)?,
        );

        Ok(reply)
    }

    /// Comments on a post with their replies, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails
    pub async fn comment_threads(&self, post_id: &str) -> AppResult<Vec<CommentThread>> {
        let comment_rows = sqlx::query(
            r"
            SELECT id, post_id, author_id, body, like_count, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at ASC
            ",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list comments: {e}")))?;

        let mut threads = Vec::with_capacity(comment_rows.len());
        for row in &comment_rows {
            let comment = Self::row_to_comment(row)?;
            let reply_rows = sqlx::query(
                r"
                SELECT id, comment_id, author_id, body, like_count, created_at
                FROM replies
                WHERE comment_id = $1
                ORDER BY created_at ASC
                ",
            )
            .bind(&comment.id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list replies: {e}")))?;

            let replies = reply_rows
                .iter()
                .map(Self::row_to_reply)
                .collect::<AppResult<Vec<_>>>()?;

            threads.push(CommentThread { comment, replies });
        }

        Ok(threads)
    }

    // ========================================================================
    // Row conversions
    // ========================================================================

    fn row_to_post(row: &sqlx::sqlite::SqliteRow) -> AppResult<MediaPost> {
        let owner: String = row.get("owner_id");
        Ok(MediaPost {
            id: row.get("id"),
            owner_id: Uuid::parse_str(&owner)
                .map_err(|e| AppError::internal(format!("Failed to parse owner UUID: {e}")))?,
            media_url: row.get("media_url"),
            caption: row.get("caption"),
            like_count: row.get("like_count"),
            comment_count: row.get("comment_count"),
            created_at: row.get("created_at"),
        })
    }

    fn row_to_comment(row: &sqlx::sqlite::SqliteRow) -> AppResult<Comment> {
        let author: String = row.get("author_id");
        Ok(Comment {
            id: row.get("id"),
            post_id: row.get("post_id"),
            author_id: Uuid::parse_str(&author)
                .map_err(|e| AppError::internal(format!("Failed to parse author UUID: {e}")))?,
            body: row.get("body"),
            like_count: row.get("like_count"),
            created_at: row.get("created_at"),
        })
    }

    fn row_to_reply(row: &sqlx::sqlite::SqliteRow) -> AppResult<Reply> {
        let author: String = row.get("author_id");
        Ok(Reply {
            id: row.get("id"),
            comment_id: row.get("comment_id"),
            author_id: Uuid::parse_str(&author)
                .map_err(|e| AppError::internal(format!("Failed to parse author UUID: {e}")))?,
            body: row.get("body"),
            like_count: row.get("like_count"),
            created_at: row.get("created_at"),
        })
    }
}
