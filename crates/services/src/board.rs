//! # BoardService
//!
//! Thin orchestration over the store ports (the board controller): checks
//! the signed-in user, validates input, routes mutations to the adapters,
//! and assembles the load-time snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use mime::Mime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use domains::error::{BoardError, Result};
use domains::models::{
    Comment, Idea, IdeaCategory, IdeaStatus, MemberProfile, VoteDirection,
};
use domains::ports::{
    CommentRepo, IdeaRepo, Identity, MediaStorage, MemberDirectory, VoteRepo,
};
use domains::vote;

/// The collaborator ports one board instance operates through.
pub struct BoardPorts {
    pub ideas: Arc<dyn IdeaRepo>,
    pub comments: Arc<dyn CommentRepo>,
    pub votes: Arc<dyn VoteRepo>,
    pub identity: Arc<dyn Identity>,
    pub directory: Arc<dyn MemberDirectory>,
    pub media: Arc<dyn MediaStorage>,
}

/// Validation limits, in characters. Wired from configuration by the
/// binary; services stay free of the config loader.
#[derive(Debug, Clone)]
pub struct Limits {
    pub max_title: usize,
    pub max_description: usize,
    pub max_comment: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_title: 120,
            max_description: 4000,
            max_comment: 1000,
        }
    }
}

/// Input for a new idea. The image rides along as raw bytes; a failed
/// upload degrades to an idea without an image.
pub struct NewIdea {
    pub title: String,
    pub description: String,
    pub category: IdeaCategory,
    pub image: Option<(Bytes, Mime)>,
}

pub struct NewComment {
    pub content: String,
    pub image: Option<(Bytes, Mime)>,
}

/// Everything a client needs to render the board at connect time, and
/// again after a feed gap.
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    /// Newest first.
    pub ideas: Vec<Idea>,
    /// Oldest first per idea.
    pub comments: HashMap<Uuid, Vec<Comment>>,
    /// The requesting user's own directions.
    pub my_votes: HashMap<Uuid, VoteDirection>,
    /// Display profiles for the idea authors present in `ideas`.
    pub authors: HashMap<Uuid, MemberProfile>,
}

pub struct BoardService {
    ports: BoardPorts,
    limits: Limits,
}

impl BoardService {
    pub fn new(ports: BoardPorts, limits: Limits) -> Self {
        Self { ports, limits }
    }

    /// The signed-in user, or `Unauthorized`. Every mutating call starts
    /// here.
    pub fn current_user(&self) -> Result<Uuid> {
        self.ports
            .identity
            .current_user()
            .ok_or_else(|| BoardError::Unauthorized("no signed-in user".into()))
    }

    /// Best-effort upload: blob hosting failure never blocks the enclosing
    /// create, the image is simply dropped.
    async fn upload_image(&self, image: Option<(Bytes, Mime)>) -> Option<String> {
        let (data, content_type) = image?;
        match self.ports.media.upload(data, content_type).await {
            Ok(url) => Some(url),
            Err(err) => {
                warn!(error = %err, "image upload failed, continuing without image");
                None
            }
        }
    }

    pub async fn create_idea(&self, new: NewIdea) -> Result<Idea> {
        let author = self.current_user()?;
        let title = non_empty("title", &new.title, self.limits.max_title)?;
        let description =
            non_empty("description", &new.description, self.limits.max_description)?;

        let image_url = self.upload_image(new.image).await;
        let idea = Idea {
            id: Uuid::now_v7(),
            author_id: author,
            title,
            description,
            category: new.category,
            image_url,
            votes: 0,
            status: IdeaStatus::Pending,
            created_at: Utc::now(),
        };
        self.ports.ideas.insert(idea.clone()).await?;
        info!(idea = %idea.id, author = %author, "idea created");
        Ok(idea)
    }

    /// Reads the caller's current entry, computes the transition, and
    /// applies it. The read and the apply are two separate store calls by
    /// contract; the ledger's `(idea, user)` uniqueness is the only hard
    /// guarantee under concurrency (see [`VoteRepo::recount`]).
    pub async fn cast_vote(&self, idea_id: Uuid, direction: VoteDirection) -> Result<Idea> {
        let user = self.current_user()?;
        let existing = self.ports.votes.current(idea_id, user).await?;
        let transition = vote::transition(existing, direction);
        let idea = self.ports.votes.apply(idea_id, user, transition).await?;
        debug!(idea = %idea_id, user = %user, delta = transition.delta, "vote applied");
        Ok(idea)
    }

    pub async fn add_comment(&self, idea_id: Uuid, new: NewComment) -> Result<Comment> {
        let author = self.current_user()?;
        let content = non_empty("comment", &new.content, self.limits.max_comment)?;

        if self.ports.ideas.fetch(idea_id).await?.is_none() {
            return Err(BoardError::NotFound("idea", idea_id.to_string()));
        }
        let image_url = self.upload_image(new.image).await;
        let comment = Comment {
            id: Uuid::now_v7(),
            idea_id,
            author_id: author,
            content,
            image_url,
            created_at: Utc::now(),
        };
        self.ports.comments.insert(comment.clone()).await?;
        debug!(idea = %idea_id, comment = %comment.id, "comment added");
        Ok(comment)
    }

    /// Only the author may delete; the store cascades ledger entries and
    /// comments before the idea itself.
    pub async fn delete_idea(&self, idea_id: Uuid) -> Result<()> {
        let user = self.current_user()?;
        let idea = self
            .ports
            .ideas
            .fetch(idea_id)
            .await?
            .ok_or_else(|| BoardError::NotFound("idea", idea_id.to_string()))?;
        if idea.author_id != user {
            return Err(BoardError::Unauthorized(
                "only the author may delete an idea".into(),
            ));
        }
        self.ports.ideas.delete(idea_id).await?;
        info!(idea = %idea_id, author = %user, "idea deleted");
        Ok(())
    }

    /// Full authoritative refetch: the rebuild path at connect and after
    /// any feed gap.
    pub async fn snapshot(&self) -> Result<BoardSnapshot> {
        let user = self.current_user()?;
        let ideas = self.ports.ideas.list_newest_first().await?;

        let mut comments = HashMap::new();
        let mut authors: HashMap<Uuid, MemberProfile> = HashMap::new();
        for idea in &ideas {
            comments.insert(idea.id, self.ports.comments.list_oldest_first(idea.id).await?);
            if !authors.contains_key(&idea.author_id) {
                if let Some(profile) = self.ports.directory.profile(idea.author_id).await? {
                    authors.insert(idea.author_id, profile);
                }
            }
        }
        let my_votes = self.ports.votes.for_user(user).await?.into_iter().collect();
        Ok(BoardSnapshot { ideas, comments, my_votes, authors })
    }
}

/// Trims and enforces the non-empty and length rules shared by all free
/// text fields.
fn non_empty(field: &'static str, raw: &str, max_chars: usize) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BoardError::Validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(BoardError::Validation(format!(
            "{field} exceeds {max_chars} characters"
        )));
    }
    Ok(trimmed.to_owned())
}
