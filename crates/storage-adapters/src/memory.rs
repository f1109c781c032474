//! # MemoryStore
//!
//! In-process authoritative store for ideas, comments, and the vote
//! ledger. One lock guards all three tables: a ledger mutation and its
//! counter adjustment commit together, cascade deletes see a consistent
//! view, and change events are published under the same guard so per-row
//! event order matches commit order.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use domains::error::{BoardError, Result};
use domains::events::{ChangeEvent, TableKind, TableRow};
use domains::models::{Comment, Idea, VoteDirection, VoteEntry};
use domains::ports::{CommentRepo, IdeaRepo, VoteRepo};
use domains::vote::VoteTransition;

use crate::feed::FeedHub;

#[derive(Default)]
struct Tables {
    ideas: HashMap<Uuid, Idea>,
    comments: Vec<Comment>,
    /// Keyed by `(idea_id, user_id)`; the map key IS the uniqueness
    /// constraint on the ledger.
    votes: HashMap<(Uuid, Uuid), VoteEntry>,
}

pub struct MemoryStore {
    tables: RwLock<Tables>,
    feed: Arc<FeedHub>,
}

impl MemoryStore {
    pub fn new(feed: Arc<FeedHub>) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            feed,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| BoardError::Transient("store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| BoardError::Transient("store lock poisoned".into()))
    }
}

#[async_trait]
impl IdeaRepo for MemoryStore {
    async fn insert(&self, idea: Idea) -> Result<()> {
        let mut tables = self.write()?;
        if tables.ideas.contains_key(&idea.id) {
            return Err(BoardError::Conflict(format!("idea {} already exists", idea.id)));
        }
        tables.ideas.insert(idea.id, idea.clone());
        self.feed
            .publish(ChangeEvent::insert(TableKind::Ideas, TableRow::Idea(idea)));
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Idea>> {
        Ok(self.read()?.ideas.get(&id).cloned())
    }

    async fn list_newest_first(&self) -> Result<Vec<Idea>> {
        let mut ideas: Vec<Idea> = self.read()?.ideas.values().cloned().collect();
        ideas.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(ideas)
    }

    /// Cascade: ledger entries and comments go first, each with its own
    /// delete event, then the idea itself.
    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tables = self.write()?;
        let idea = tables
            .ideas
            .remove(&id)
            .ok_or_else(|| BoardError::NotFound("idea", id.to_string()))?;

        let mut dropped_votes = Vec::new();
        tables.votes.retain(|(idea_id, _), entry| {
            if *idea_id == id {
                dropped_votes.push(entry.clone());
                false
            } else {
                true
            }
        });
        let mut dropped_comments = Vec::new();
        tables.comments.retain(|comment| {
            if comment.idea_id == id {
                dropped_comments.push(comment.clone());
                false
            } else {
                true
            }
        });

        debug!(
            idea = %id,
            votes = dropped_votes.len(),
            comments = dropped_comments.len(),
            "cascading idea delete"
        );
        for entry in dropped_votes {
            self.feed
                .publish(ChangeEvent::delete(TableKind::Votes, TableRow::Vote(entry)));
        }
        for comment in dropped_comments {
            self.feed.publish(ChangeEvent::delete(
                TableKind::Comments,
                TableRow::Comment(comment),
            ));
        }
        self.feed
            .publish(ChangeEvent::delete(TableKind::Ideas, TableRow::Idea(idea)));
        Ok(())
    }
}

#[async_trait]
impl CommentRepo for MemoryStore {
    async fn insert(&self, comment: Comment) -> Result<()> {
        let mut tables = self.write()?;
        if !tables.ideas.contains_key(&comment.idea_id) {
            return Err(BoardError::NotFound("idea", comment.idea_id.to_string()));
        }
        tables.comments.push(comment.clone());
        self.feed.publish(ChangeEvent::insert(
            TableKind::Comments,
            TableRow::Comment(comment),
        ));
        Ok(())
    }

    async fn list_oldest_first(&self, idea_id: Uuid) -> Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .read()?
            .comments
            .iter()
            .filter(|c| c.idea_id == idea_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(comments)
    }
}

#[async_trait]
impl VoteRepo for MemoryStore {
    async fn current(&self, idea_id: Uuid, user_id: Uuid) -> Result<Option<VoteDirection>> {
        Ok(self
            .read()?
            .votes
            .get(&(idea_id, user_id))
            .map(|entry| entry.direction))
    }

    async fn apply(
        &self,
        idea_id: Uuid,
        user_id: Uuid,
        transition: VoteTransition,
    ) -> Result<Idea> {
        let mut tables = self.write()?;
        if !tables.ideas.contains_key(&idea_id) {
            return Err(BoardError::NotFound("idea", idea_id.to_string()));
        }

        let key = (idea_id, user_id);
        let prior = tables.votes.contains_key(&key);
        let ledger_event = match transition.next {
            Some(direction) => {
                let entry = tables
                    .votes
                    .entry(key)
                    .and_modify(|entry| entry.direction = direction)
                    .or_insert_with(|| VoteEntry {
                        idea_id,
                        user_id,
                        direction,
                        created_at: Utc::now(),
                    })
                    .clone();
                let row = TableRow::Vote(entry);
                Some(if prior {
                    ChangeEvent::update(TableKind::Votes, row)
                } else {
                    ChangeEvent::insert(TableKind::Votes, row)
                })
            }
            None => tables
                .votes
                .remove(&key)
                .map(|entry| ChangeEvent::delete(TableKind::Votes, TableRow::Vote(entry))),
        };

        // Counter adjustment commits under the same guard as the ledger
        // mutation above.
        let idea = tables
            .ideas
            .get_mut(&idea_id)
            .ok_or_else(|| BoardError::NotFound("idea", idea_id.to_string()))?;
        idea.votes += transition.delta;
        let updated = idea.clone();

        if let Some(event) = ledger_event {
            self.feed.publish(event);
        }
        self.feed.publish(ChangeEvent::update(
            TableKind::Ideas,
            TableRow::Idea(updated.clone()),
        ));
        Ok(updated)
    }

    async fn for_user(&self, user_id: Uuid) -> Result<Vec<(Uuid, VoteDirection)>> {
        Ok(self
            .read()?
            .votes
            .values()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| (entry.idea_id, entry.direction))
            .collect())
    }

    async fn recount(&self, idea_id: Uuid) -> Result<Idea> {
        let mut tables = self.write()?;
        let tally: i64 = tables
            .votes
            .values()
            .filter(|entry| entry.idea_id == idea_id)
            .map(|entry| entry.direction.weight())
            .sum();
        let idea = tables
            .ideas
            .get_mut(&idea_id)
            .ok_or_else(|| BoardError::NotFound("idea", idea_id.to_string()))?;
        if idea.votes == tally {
            return Ok(idea.clone());
        }
        debug!(idea = %idea_id, stored = idea.votes, tally, "repairing vote counter");
        idea.votes = tally;
        let updated = idea.clone();
        self.feed.publish(ChangeEvent::update(
            TableKind::Ideas,
            TableRow::Idea(updated.clone()),
        ));
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::models::{IdeaCategory, IdeaStatus};
    use domains::vote;

    fn store() -> MemoryStore {
        MemoryStore::new(Arc::new(FeedHub::new(64)))
    }

    fn idea(author: Uuid) -> Idea {
        Idea {
            id: Uuid::now_v7(),
            author_id: author,
            title: "title".into(),
            description: "description".into(),
            category: IdeaCategory::Improvement,
            image_url: None,
            votes: 0,
            status: IdeaStatus::Pending,
            created_at: Utc::now(),
        }
    }

    fn comment(idea_id: Uuid, author: Uuid) -> Comment {
        Comment {
            id: Uuid::now_v7(),
            idea_id,
            author_id: author,
            content: "content".into(),
            image_url: None,
            created_at: Utc::now(),
        }
    }

    /// Casts through the same read-then-apply sequence the service uses.
    async fn cast(store: &MemoryStore, idea_id: Uuid, user: Uuid, direction: VoteDirection) -> Idea {
        let existing = store.current(idea_id, user).await.unwrap();
        let transition = vote::transition(existing, direction);
        store.apply(idea_id, user, transition).await.unwrap()
    }

    #[tokio::test]
    async fn duplicate_idea_ids_conflict() {
        let store = store();
        let row = idea(Uuid::now_v7());
        IdeaRepo::insert(&store, row.clone()).await.unwrap();
        let err = IdeaRepo::insert(&store, row).await.unwrap_err();
        assert!(matches!(err, BoardError::Conflict(_)));
    }

    #[tokio::test]
    async fn a_user_never_holds_two_entries_for_one_idea() {
        let store = store();
        let user = Uuid::now_v7();
        let row = idea(user);
        IdeaRepo::insert(&store, row.clone()).await.unwrap();

        cast(&store, row.id, user, VoteDirection::Up).await;
        cast(&store, row.id, user, VoteDirection::Down).await;
        let entries = store.for_user(user).await.unwrap();
        assert_eq!(entries, vec![(row.id, VoteDirection::Down)]);
    }

    #[tokio::test]
    async fn counter_tracks_the_ledger_through_the_reference_scenario() {
        let store = store();
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());
        let row = idea(a);
        IdeaRepo::insert(&store, row.clone()).await.unwrap();

        // A up, B up, A switches down, A toggles the down off.
        assert_eq!(cast(&store, row.id, a, VoteDirection::Up).await.votes, 1);
        assert_eq!(cast(&store, row.id, b, VoteDirection::Up).await.votes, 2);
        assert_eq!(cast(&store, row.id, a, VoteDirection::Down).await.votes, 0);
        assert_eq!(cast(&store, row.id, a, VoteDirection::Down).await.votes, 1);

        assert_eq!(store.for_user(a).await.unwrap(), vec![]);
        assert_eq!(store.for_user(b).await.unwrap(), vec![(row.id, VoteDirection::Up)]);
        // the counter and the ledger agree, so the repair is a no-op
        assert_eq!(store.recount(row.id).await.unwrap().votes, 1);
    }

    #[tokio::test]
    async fn recount_repairs_a_skewed_counter() {
        let store = store();
        let user = Uuid::now_v7();
        let row = idea(user);
        IdeaRepo::insert(&store, row.clone()).await.unwrap();
        cast(&store, row.id, user, VoteDirection::Up).await;

        // a lost update: the ledger entry landed but the adjustment did not
        store.write().unwrap().ideas.get_mut(&row.id).unwrap().votes = 0;
        assert_eq!(store.recount(row.id).await.unwrap().votes, 1);
    }

    #[tokio::test]
    async fn cascade_delete_leaves_no_children() {
        let store = store();
        let (author, voter) = (Uuid::now_v7(), Uuid::now_v7());
        let row = idea(author);
        IdeaRepo::insert(&store, row.clone()).await.unwrap();
        CommentRepo::insert(&store, comment(row.id, voter)).await.unwrap();
        CommentRepo::insert(&store, comment(row.id, author)).await.unwrap();
        cast(&store, row.id, voter, VoteDirection::Up).await;

        IdeaRepo::delete(&store, row.id).await.unwrap();

        assert!(store.fetch(row.id).await.unwrap().is_none());
        assert!(store.list_oldest_first(row.id).await.unwrap().is_empty());
        assert!(store.for_user(voter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn comments_read_back_oldest_first() {
        let store = store();
        let author = Uuid::now_v7();
        let row = idea(author);
        IdeaRepo::insert(&store, row.clone()).await.unwrap();

        let first = comment(row.id, author);
        let second = comment(row.id, author);
        CommentRepo::insert(&store, first.clone()).await.unwrap();
        CommentRepo::insert(&store, second.clone()).await.unwrap();

        let listed = store.list_oldest_first(row.id).await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn voting_on_a_missing_idea_is_not_found() {
        let store = store();
        let err = store
            .apply(
                Uuid::now_v7(),
                Uuid::now_v7(),
                vote::transition(None, VoteDirection::Up),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::NotFound("idea", _)));
    }
}
