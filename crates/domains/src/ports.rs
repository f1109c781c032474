//! # Core Ports
//!
//! Contracts between the board and its collaborators. Adapters implement
//! these traits; services and sessions only ever see the trait objects.

use async_trait::async_trait;
use bytes::Bytes;
use mime::Mime;
use uuid::Uuid;

use crate::error::{FeedError, Result};
use crate::events::{ChangeEvent, TableKind};
use crate::models::{Comment, Idea, MemberProfile, VoteDirection};
use crate::vote::VoteTransition;

/// Persistence contract for idea records.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait IdeaRepo: Send + Sync {
    async fn insert(&self, idea: Idea) -> Result<()>;
    async fn fetch(&self, id: Uuid) -> Result<Option<Idea>>;
    /// All ideas, newest first.
    async fn list_newest_first(&self) -> Result<Vec<Idea>>;
    /// Deletes the idea, cascading its ledger entries and comments first.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Persistence contract for comments. Append-only by design: there is no
/// update or single-delete operation.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn insert(&self, comment: Comment) -> Result<()>;
    /// All comments for the idea, oldest first (chronological reading order).
    async fn list_oldest_first(&self, idea_id: Uuid) -> Result<Vec<Comment>>;
}

/// Vote ledger contract. The store must enforce at most one entry per
/// `(idea_id, user_id)`, even under concurrent casts by the same user.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait VoteRepo: Send + Sync {
    /// The caller's own current direction on the idea, if any. No
    /// operation exists to read another user's vote.
    async fn current(&self, idea_id: Uuid, user_id: Uuid) -> Result<Option<VoteDirection>>;

    /// Applies the ledger mutation and the matching counter adjustment.
    /// The two MUST be atomic with respect to each other for one idea.
    /// Returns the updated idea row.
    async fn apply(&self, idea_id: Uuid, user_id: Uuid, transition: VoteTransition)
        -> Result<Idea>;

    /// All of one user's entries, keyed by idea. Used to build `my_votes`
    /// at load time.
    async fn for_user(&self, user_id: Uuid) -> Result<Vec<(Uuid, VoteDirection)>>;

    /// Recomputes `votes` from the ledger entries and stores the result.
    /// Repair path for deployments where `apply` cannot be atomic; on a
    /// consistent store this is a no-op.
    async fn recount(&self, idea_id: Uuid) -> Result<Idea>;
}

/// Pull side of one change-feed subscription. Dropping the source
/// unsubscribes.
#[async_trait]
pub trait EventSource: Send {
    /// The next committed mutation on the subscribed table. Delivery is
    /// at-least-once; a [`FeedError`] means the view has a gap of unknown
    /// size and the caller must rebuild from a snapshot.
    async fn next_event(&mut self) -> std::result::Result<ChangeEvent, FeedError>;
}

/// Subscription entry point of the realtime feed.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    async fn subscribe(&self, table: TableKind) -> Result<Box<dyn EventSource>>;
}

/// Identity collaborator: supplies the stable id of the signed-in user.
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait Identity: Send + Sync {
    fn current_user(&self) -> Option<Uuid>;
}

/// Member directory collaborator: display profiles for board rows.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn profile(&self, user_id: Uuid) -> Result<Option<MemberProfile>>;
}

/// Blob hosting collaborator: stores uploaded bytes, returns a public URL.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn upload(&self, data: Bytes, content_type: Mime) -> Result<String>;
}
