//! # BoardSession
//!
//! One client's live connection to the board. The session owns its feed
//! subscriptions and its [`BoardState`]: it is explicitly constructed on
//! view entry and torn down on exit, so no events are ever applied to a
//! stale view. Optimistic mutations run synchronously before the
//! confirming store call; failures roll the guess back.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use domains::error::{BoardError, FeedError, Result};
use domains::events::TableKind;
use domains::models::{Comment, Idea, VoteDirection};
use domains::ports::{ChangeFeed, EventSource};
use services::board::{BoardService, NewComment, NewIdea};

use crate::state::{BoardState, StateChange};

/// Outcome of one [`BoardSession::next_change`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    /// One feed event was merged.
    Merged(StateChange),
    /// The feed reported a gap; state was rebuilt from a fresh snapshot.
    Resynced,
}

pub struct BoardSession {
    service: Arc<BoardService>,
    feed: Arc<dyn ChangeFeed>,
    state: BoardState,
    ideas_feed: Box<dyn EventSource>,
    comments_feed: Box<dyn EventSource>,
}

impl BoardSession {
    /// Subscribes to the ideas and comments tables, then rebuilds state
    /// from a snapshot. Subscribing first means a mutation committed
    /// during the fetch is not lost; replaying it over the snapshot is
    /// safe because merges are idempotent.
    pub async fn open(service: Arc<BoardService>, feed: Arc<dyn ChangeFeed>) -> Result<Self> {
        let user = service.current_user()?;
        let ideas_feed = feed.subscribe(TableKind::Ideas).await?;
        let comments_feed = feed.subscribe(TableKind::Comments).await?;

        let mut state = BoardState::new();
        state.load(service.snapshot().await?);
        info!(user = %user, "board session opened");
        Ok(Self { service, feed, state, ideas_feed, comments_feed })
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// Creates an idea. Not optimistic: the server assigns the id, and the
    /// insert event from the feed lands the row in state.
    pub async fn create_idea(&mut self, new: NewIdea) -> Result<Idea> {
        self.service.create_idea(new).await
    }

    /// Casts a vote with immediate local feedback: the optimistic apply
    /// runs before the first await. On failure the guess is rolled back,
    /// except `NotFound`, which reconciles by dropping the idea locally.
    pub async fn vote(&mut self, idea_id: Uuid, direction: VoteDirection) -> Result<Idea> {
        let undo = self
            .state
            .apply_my_vote(idea_id, direction)
            .ok_or_else(|| BoardError::NotFound("idea", idea_id.to_string()))?;

        match self.service.cast_vote(idea_id, direction).await {
            Ok(idea) => Ok(idea),
            Err(err @ BoardError::NotFound(..)) => {
                debug!(idea = %idea_id, "vote hit a deleted idea, dropping it locally");
                self.state.remove_idea(idea_id);
                Err(err)
            }
            Err(err) => {
                self.state.revert_vote(undo);
                Err(err)
            }
        }
    }

    /// Adds a comment. Not optimistic; a `NotFound` still reconciles the
    /// local list by dropping the vanished idea.
    pub async fn add_comment(&mut self, idea_id: Uuid, new: NewComment) -> Result<Comment> {
        match self.service.add_comment(idea_id, new).await {
            Err(err @ BoardError::NotFound(..)) => {
                self.state.remove_idea(idea_id);
                Err(err)
            }
            other => other,
        }
    }

    /// Deletes the caller's own idea, removing it locally first. A
    /// `NotFound` from the store means someone (or a previous retry) beat
    /// us to it; the local removal already matches, so that is success.
    pub async fn delete_idea(&mut self, idea_id: Uuid) -> Result<()> {
        let removed = self
            .state
            .remove_idea(idea_id)
            .ok_or_else(|| BoardError::NotFound("idea", idea_id.to_string()))?;

        match self.service.delete_idea(idea_id).await {
            Ok(()) => Ok(()),
            Err(BoardError::NotFound(..)) => Ok(()),
            Err(err) => {
                self.state.restore_idea(removed);
                Err(err)
            }
        }
    }

    /// Waits for the next feed event and merges it. Both failure modes
    /// are gaps of unknown size (there is no replay log to consult), so
    /// the state is rebuilt from a fresh snapshot: directly on a lag,
    /// after re-subscribing on a lost connection.
    pub async fn next_change(&mut self) -> Result<SessionChange> {
        let event = tokio::select! {
            event = self.ideas_feed.next_event() => event,
            event = self.comments_feed.next_event() => event,
        };
        match event {
            Ok(event) => Ok(SessionChange::Merged(self.state.apply_event(&event))),
            Err(FeedError::Lagged(missed)) => {
                warn!(missed, "change feed lagged, rebuilding from snapshot");
                self.resync().await?;
                Ok(SessionChange::Resynced)
            }
            Err(FeedError::Closed) => {
                warn!("change feed connection lost, resubscribing");
                self.ideas_feed = self.feed.subscribe(TableKind::Ideas).await?;
                self.comments_feed = self.feed.subscribe(TableKind::Comments).await?;
                self.resync().await?;
                Ok(SessionChange::Resynced)
            }
        }
    }

    async fn resync(&mut self) -> Result<()> {
        self.state.load(self.service.snapshot().await?);
        Ok(())
    }

    /// Tears the session down, dropping both subscriptions. Dropping the
    /// session without calling this releases them just the same; `close`
    /// makes the teardown explicit and logged.
    pub fn close(self) {
        info!("board session closed");
    }
}
