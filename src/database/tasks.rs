// ABOUTME: Per-user schedule entries backing the planner surface
// ABOUTME: CRUD plus completion toggling, always scoped to the owning user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use std::sync::Arc;

use serde_json::json;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::TaskItem;
use crate::sync::{ChangeKind, ListenerHub};

/// Task database operations manager
pub struct TaskManager {
    pool: SqlitePool,
    hub: Arc<ListenerHub>,
}

impl TaskManager {
    /// Create a new task manager
    #[must_use]
    pub const fn new(pool: SqlitePool, hub: Arc<ListenerHub>) -> Self {
        Self { pool, hub }
    }

    /// Create a task
    ///
    /// # Errors
    ///
    /// Returns an error if the title is empty or the insert fails
    pub async fn create_task(
        &self,
        user_id: Uuid,
        title: &str,
        note: Option<&str>,
        due_date: Option<&str>,
    ) -> AppResult<TaskItem> {
        if title.trim().is_empty() {
            return Err(AppError::invalid_input("Task title is empty"));
        }

        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now();

        sqlx::query(
            r"
            INSERT INTO tasks (id, user_id, title, note, due_date, completed, created_at)
            VALUES ($1, $2, $3, $4, $5, 0, $6)
            ",
        )
        .bind(&id)
        .bind(user_id.to_string())
        .bind(title)
        .bind(note)
        .bind(due_date)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create task: {e}")))?;

        let task = TaskItem {
            id,
            user_id,
            title: title.to_owned(),
            note: note.map(ToOwned::to_owned),
            due_date: due_date.map(ToOwned::to_owned),
            completed: false,
            created_at: now,
        };

        self.publish(user_id, ChangeKind::Created, &task)?;

        Ok(task)
    }

    /// Update a task's title, note, and due date; owner only
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn update_task(
        &self,
        task_id: &str,
        user_id: Uuid,
        title: &str,
        note: Option<&str>,
        due_date: Option<&str>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE tasks SET title = $1, note = $2, due_date = $3
            WHERE id = $4 AND user_id = $5
            ",
        )
        .bind(title)
        .bind(note)
        .bind(due_date)
        .bind(task_id)
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update task: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Flip a task's completion flag; owner only
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn toggle_completed(&self, task_id: &str, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE tasks SET completed = NOT completed
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(task_id)
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to toggle task: {e}")))?;

        let toggled = result.rows_affected() > 0;
        if toggled {
            self.hub.publish(
                &Self::topic(user_id),
                ChangeKind::Updated,
                json!({ "id": task_id }),
            );
        }

        Ok(toggled)
    }

    /// Delete a task; owner only
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn delete_task(&self, task_id: &str, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(task_id)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete task: {e}")))?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            self.hub.publish(
                &Self::topic(user_id),
                ChangeKind::Deleted,
                json!({ "id": task_id }),
            );
        }

        Ok(deleted)
    }

    /// All tasks for a user, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_tasks(&self, user_id: Uuid) -> AppResult<Vec<TaskItem>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, title, note, due_date, completed, created_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at ASC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list tasks: {e}")))?;

        rows.iter().map(Self::row_to_task).collect()
    }

    fn publish(&self, user_id: Uuid, kind: ChangeKind, task: &TaskItem) -> AppResult<()> {
        self.hub
            .publish(&Self::topic(user_id), kind, serde_json::to_value(task)?);
        Ok(())
    }

    fn topic(user_id: Uuid) -> String {
        format!("tasks/{user_id}")
    }

    fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> AppResult<TaskItem> {
        let uid: String = row.get("user_id");
        Ok(TaskItem {
            id: row.get("id"),
            user_id: Uuid::parse_str(&uid)
                .map_err(|e| AppError::internal(format!("Failed to parse user UUID: {e}")))?,
            title: row.get("title"),
            note: row.get("note"),
            due_date: row.get("due_date"),
            completed: row.get("completed"),
            created_at: row.get("created_at"),
        })
    }
}
