//! # Domain Models
//!
//! These structs represent the core entities of the idea feedback board.
//! We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-submitted feedback item, the primary entity of the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    pub id: Uuid,
    /// Owning user; immutable after creation.
    pub author_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: IdeaCategory,
    /// Public URL of an uploaded image, set once at creation.
    pub image_url: Option<String>,
    /// Denormalized sum of this idea's vote ledger (+1 per up, −1 per down).
    /// Mutated only by the vote path and the recount repair.
    pub votes: i64,
    pub status: IdeaStatus,
    pub created_at: DateTime<Utc>,
}

/// Fixed category set a member picks from when posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdeaCategory {
    Feature,
    Improvement,
    Bug,
    Other,
}

/// Roadmap state of an idea. Every idea starts out `Pending`; no board
/// operation moves it further (that is a back-office concern).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdeaStatus {
    Pending,
    Planned,
    Done,
}

impl Default for IdeaStatus {
    fn default() -> Self {
        IdeaStatus::Pending
    }
}

/// One user's current vote direction on one idea. The `(idea_id, user_id)`
/// pair is unique: a user has at most one entry per idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteEntry {
    pub idea_id: Uuid,
    pub user_id: Uuid,
    pub direction: VoteDirection,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Contribution of one ledger entry to the idea's `votes` counter.
    pub fn weight(self) -> i64 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}

/// A member's remark on an idea. Comments are append-only: they are never
/// edited or removed on their own, only cascaded away with their idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    /// Parent idea; immutable.
    pub idea_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Display profile of a board member, resolved through the member
/// directory at load time. Profiles never travel through the change feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub user_id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub city: String,
}
