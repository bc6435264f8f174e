// ABOUTME: Common data models for accounts, relationships, feed content, messaging, and tasks
// ABOUTME: Row-shaped structs shared between the database managers and the routes layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stryde Fitness

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account with profile and onboarding attributes
///
/// Relationship membership (pending requests, confirmed friends) is stored in
/// dedicated tables and loaded through the friend manager, not on this struct.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Stable account identifier
    pub id: Uuid,
    /// Login email, unique across accounts
    pub email: String,
    /// Display name shown on the feed and in chat
    pub display_name: Option<String>,
    /// Bcrypt hash of the account password
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Stable retrieval URI of the profile image, if one was uploaded
    pub avatar_url: Option<String>,
    /// Onboarding: age in years
    pub age: Option<i64>,
    /// Onboarding: height in centimeters
    pub height_cm: Option<f64>,
    /// Onboarding: weight in kilograms
    pub weight_kg: Option<f64>,
    /// Onboarding: stated training goal (e.g. "Muscle Gain", "Weight Loss")
    pub goal: Option<String>,
    /// Onboarding: self-reported fitness level
    pub fitness_level: Option<String>,
    /// Onboarding: free-form health notes
    pub health_notes: Option<String>,
    /// Whether the account email has been verified
    pub email_verified: bool,
    /// Whether the onboarding flow has been completed
    pub onboarding_complete: bool,
    /// Account creation time
    pub created_at: DateTime<Utc>,
    /// Last successful authentication or activity
    pub last_active: DateTime<Utc>,
}

impl User {
    /// Create a fresh, unverified account record
    #[must_use]
    pub fn new(email: String, password_hash: String, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            display_name,
            password_hash,
            avatar_url: None,
            age: None,
            height_cm: None,
            weight_kg: None,
            goal: None,
            fitness_level: None,
            health_notes: None,
            email_verified: false,
            onboarding_complete: false,
            created_at: now,
            last_active: now,
        }
    }
}

/// Public slice of a user record, safe to return to other users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicProfile {
    /// Account identifier
    pub id: Uuid,
    /// Display name
    pub display_name: Option<String>,
    /// Profile image URI
    pub avatar_url: Option<String>,
}

/// Relationship between two users, seen from the first user's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipState {
    /// No request or friendship in either direction
    Unrelated,
    /// This user sent a request that is pending on the counterparty
    RequestedOutgoing,
    /// The counterparty sent a request that is pending on this user
    RequestedIncoming,
    /// Mutual, confirmed friendship
    Confirmed,
}

/// Feed content item with denormalized interaction counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaPost {
    /// Post identifier
    pub id: String,
    /// Owner account
    pub owner_id: Uuid,
    /// Retrieval URI of the posted image or video
    pub media_url: String,
    /// Optional caption, editable by the owner
    pub caption: Option<String>,
    /// Denormalized like counter, kept in step with the vote table
    pub like_count: i64,
    /// Denormalized comment counter; replies count as equal units
    pub comment_count: i64,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Top-level comment on a media post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Comment identifier
    pub id: String,
    /// Owning post
    pub post_id: String,
    /// Author account
    pub author_id: Uuid,
    /// Comment text
    pub body: String,
    /// Denormalized like counter
    pub like_count: i64,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Reply nested under a comment (one level only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    /// Reply identifier
    pub id: String,
    /// Owning comment
    pub comment_id: String,
    /// Author account
    pub author_id: Uuid,
    /// Reply text
    pub body: String,
    /// Denormalized like counter
    pub like_count: i64,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// A comment together with its replies, as rendered under a post
#[derive(Debug, Clone, Serialize)]
pub struct CommentThread {
    /// The top-level comment
    pub comment: Comment,
    /// Replies in ascending creation order
    pub replies: Vec<Reply>,
}

/// Direct message appended to a two-party channel; immutable once created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message identifier
    pub id: String,
    /// Deterministic channel key derived from the two participants
    pub channel_id: String,
    /// Sending account
    pub sender_id: Uuid,
    /// Receiving account
    pub recipient_id: Uuid,
    /// Text body; absent for pure media messages
    pub body: Option<String>,
    /// Media retrieval URI; absent for pure text messages
    pub media_url: Option<String>,
    /// Server-assigned creation time
    pub created_at: DateTime<Utc>,
    /// Insertion sequence; breaks creation-timestamp ties
    pub seq: i64,
}

/// Schedule entry owned by a single user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskItem {
    /// Task identifier
    pub id: String,
    /// Owner account
    pub user_id: Uuid,
    /// Short task title
    pub title: String,
    /// Optional longer note
    pub note: Option<String>,
    /// Optional due date (ISO 8601 date)
    pub due_date: Option<String>,
    /// Completion flag, toggled from the schedule surface
    pub completed: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}
