//! # BoardState
//!
//! The client-visible board: the idea list (newest first), comments per
//! idea (oldest first), and the user's own vote directions. Authoritative
//! change-feed events merge into state that may already carry optimistic
//! guesses; merges are idempotent and the incoming row always wins.
//!
//! Every method here is synchronous. The session calls the optimistic
//! methods in the same tick as the user action, before any await.

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use domains::events::{ChangeEvent, ChangeOp, TableKind, TableRow};
use domains::models::{Comment, Idea, VoteDirection};
use domains::vote::{self, VoteTransition};
use services::board::BoardSnapshot;

/// What one merged event changed, for the caller's rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    IdeaInserted(Uuid),
    IdeaUpdated(Uuid),
    IdeaRemoved(Uuid),
    CommentAdded { idea_id: Uuid, comment_id: Uuid },
    /// Duplicate delivery or an event this state does not track.
    Nothing,
}

/// Undo record for one optimistic vote.
#[derive(Debug, Clone, Copy)]
pub struct VoteUndo {
    idea_id: Uuid,
    previous: Option<VoteDirection>,
    transition: VoteTransition,
}

/// Undo record for one optimistic idea removal.
#[derive(Debug, Clone)]
pub struct RemovedIdea {
    idea: Idea,
    index: usize,
    comments: Vec<Comment>,
    my_vote: Option<VoteDirection>,
}

#[derive(Debug, Default)]
pub struct BoardState {
    ideas: Vec<Idea>,
    comments: HashMap<Uuid, Vec<Comment>>,
    my_votes: HashMap<Uuid, VoteDirection>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces everything with an authoritative snapshot. Used at connect
    /// and as gap recovery after a lagged or re-established feed.
    pub fn load(&mut self, snapshot: BoardSnapshot) {
        self.ideas = snapshot.ideas;
        self.comments = snapshot.comments;
        self.my_votes = snapshot.my_votes;
        debug!(ideas = self.ideas.len(), "state rebuilt from snapshot");
    }

    /// Newest first.
    pub fn ideas(&self) -> &[Idea] {
        &self.ideas
    }

    pub fn idea(&self, idea_id: Uuid) -> Option<&Idea> {
        self.ideas.iter().find(|i| i.id == idea_id)
    }

    /// Oldest first; empty if the idea is unknown.
    pub fn comments_for(&self, idea_id: Uuid) -> &[Comment] {
        self.comments.get(&idea_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn my_vote(&self, idea_id: Uuid) -> Option<VoteDirection> {
        self.my_votes.get(&idea_id).copied()
    }

    // Optimistic paths

    /// Applies the caller's vote locally with the same transition
    /// arithmetic the authoritative path uses, so the guess and the
    /// eventual event converge in the absence of concurrent voters.
    /// Returns `None` if the idea is not in local state.
    pub fn apply_my_vote(&mut self, idea_id: Uuid, direction: VoteDirection) -> Option<VoteUndo> {
        let previous = self.my_vote(idea_id);
        let transition = vote::transition(previous, direction);
        let idea = self.ideas.iter_mut().find(|i| i.id == idea_id)?;
        idea.votes += transition.delta;
        match transition.next {
            Some(next) => self.my_votes.insert(idea_id, next),
            None => self.my_votes.remove(&idea_id),
        };
        Some(VoteUndo { idea_id, previous, transition })
    }

    /// Rolls back a failed optimistic vote by applying the inverse
    /// transition. Only the local guess is restored; any authoritative
    /// update that arrived in between stays merged.
    pub fn revert_vote(&mut self, undo: VoteUndo) {
        let inverse = undo.transition.inverse(undo.previous);
        if let Some(idea) = self.ideas.iter_mut().find(|i| i.id == undo.idea_id) {
            idea.votes += inverse.delta;
        }
        match inverse.next {
            Some(direction) => self.my_votes.insert(undo.idea_id, direction),
            None => self.my_votes.remove(&undo.idea_id),
        };
    }

    /// Optimistic removal of an idea and its subtree; the return value
    /// restores everything if the authoritative delete fails.
    pub fn remove_idea(&mut self, idea_id: Uuid) -> Option<RemovedIdea> {
        let index = self.ideas.iter().position(|i| i.id == idea_id)?;
        let idea = self.ideas.remove(index);
        Some(RemovedIdea {
            idea,
            index,
            comments: self.comments.remove(&idea_id).unwrap_or_default(),
            my_vote: self.my_votes.remove(&idea_id),
        })
    }

    pub fn restore_idea(&mut self, removed: RemovedIdea) {
        let idea_id = removed.idea.id;
        let index = removed.index.min(self.ideas.len());
        self.ideas.insert(index, removed.idea);
        self.comments.insert(idea_id, removed.comments);
        if let Some(direction) = removed.my_vote {
            self.my_votes.insert(idea_id, direction);
        }
    }

    // Authoritative merges

    /// Merges one change-feed event. Replaying an already-applied event
    /// yields [`StateChange::Nothing`]; the incoming row supersedes any
    /// optimistic guess for the same row.
    pub fn apply_event(&mut self, event: &ChangeEvent) -> StateChange {
        match (&event.row, event.op) {
            (TableRow::Idea(row), ChangeOp::Insert | ChangeOp::Update) => self.merge_idea(row),
            (TableRow::Idea(row), ChangeOp::Delete) => self.merge_idea_delete(row.id),
            (TableRow::Comment(row), ChangeOp::Insert) => self.merge_comment(row),
            // Comments are append-only and `my_votes` is owned by the
            // optimistic path; everything else passes through unchanged.
            _ => StateChange::Nothing,
        }
    }

    /// Insert and update share one merge: the row is placed wholesale,
    /// which makes redelivered inserts and out-of-gap updates behave.
    fn merge_idea(&mut self, row: &Idea) -> StateChange {
        if let Some(existing) = self.ideas.iter_mut().find(|i| i.id == row.id) {
            if existing == row {
                return StateChange::Nothing;
            }
            *existing = row.clone();
            return StateChange::IdeaUpdated(row.id);
        }
        // Newest first by created_at; v7 ids break ties deterministically.
        let position = self
            .ideas
            .iter()
            .position(|i| (i.created_at, i.id) <= (row.created_at, row.id))
            .unwrap_or(self.ideas.len());
        self.ideas.insert(position, row.clone());
        StateChange::IdeaInserted(row.id)
    }

    fn merge_idea_delete(&mut self, idea_id: Uuid) -> StateChange {
        let Some(index) = self.ideas.iter().position(|i| i.id == idea_id) else {
            return StateChange::Nothing;
        };
        self.ideas.remove(index);
        self.comments.remove(&idea_id);
        self.my_votes.remove(&idea_id);
        StateChange::IdeaRemoved(idea_id)
    }

    fn merge_comment(&mut self, row: &Comment) -> StateChange {
        // Do not resurrect a comment bucket for an idea that is already
        // gone locally (its delete event may have overtaken this one).
        if self.idea(row.idea_id).is_none() {
            return StateChange::Nothing;
        }
        let list = self.comments.entry(row.idea_id).or_default();
        if list.iter().any(|c| c.id == row.id) {
            return StateChange::Nothing;
        }
        list.push(row.clone());
        StateChange::CommentAdded {
            idea_id: row.idea_id,
            comment_id: row.id,
        }
    }
}
