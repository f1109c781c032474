//! Shared fixtures for the integration suite: one in-memory backend plus
//! builders for services, sessions, and fake member input.

use std::sync::Arc;
use std::time::Duration;

use fake::faker::address::en::CityName;
use fake::faker::lorem::en::{Paragraph, Sentence};
use fake::Fake;
use uuid::Uuid;

use auth_adapters::{InMemoryDirectory, SessionIdentity};
use client::{BoardSession, SessionChange};
use configs::BoardConfig;
use domains::models::{IdeaCategory, MemberProfile};
use domains::ports::ChangeFeed;
use services::board::{BoardPorts, BoardService, Limits, NewComment, NewIdea};
use storage_adapters::{FeedHub, MemoryMediaStore, MemoryStore};

/// One shared backend the way a deployment wires it: a store publishing
/// into a feed, a member directory, and blob hosting, all sized from the
/// default configuration.
pub struct TestBoard {
    pub feed: Arc<FeedHub>,
    pub store: Arc<MemoryStore>,
    pub directory: Arc<InMemoryDirectory>,
    pub media: Arc<MemoryMediaStore>,
    config: BoardConfig,
}

impl TestBoard {
    pub fn new() -> Self {
        Self::with_feed_buffer(BoardConfig::default().feed_buffer)
    }

    pub fn with_feed_buffer(buffer: usize) -> Self {
        let config = BoardConfig::default();
        let feed = Arc::new(FeedHub::new(buffer));
        Self {
            store: Arc::new(MemoryStore::new(feed.clone())),
            feed,
            directory: Arc::new(InMemoryDirectory::new()),
            media: Arc::new(MemoryMediaStore::new(config.max_upload_bytes)),
            config,
        }
    }

    /// Registers a member and returns their id.
    pub fn member(&self, display_name: &str) -> Uuid {
        let user_id = Uuid::now_v7();
        self.directory.upsert(MemberProfile {
            user_id,
            display_name: display_name.to_owned(),
            avatar_url: None,
            city: CityName().fake(),
        });
        user_id
    }

    pub fn service_for(&self, user: Uuid) -> Arc<BoardService> {
        self.service_with_identity(SessionIdentity::signed_in(user))
    }

    pub fn anonymous_service(&self) -> Arc<BoardService> {
        self.service_with_identity(SessionIdentity::anonymous())
    }

    fn service_with_identity(&self, identity: SessionIdentity) -> Arc<BoardService> {
        Arc::new(BoardService::new(
            BoardPorts {
                ideas: self.store.clone(),
                comments: self.store.clone(),
                votes: self.store.clone(),
                identity: Arc::new(identity),
                directory: self.directory.clone(),
                media: self.media.clone(),
            },
            Limits {
                max_title: self.config.max_title_chars,
                max_description: self.config.max_description_chars,
                max_comment: self.config.max_comment_chars,
            },
        ))
    }

    pub async fn session_for(&self, user: Uuid) -> BoardSession {
        let feed: Arc<dyn ChangeFeed> = self.feed.clone();
        BoardSession::open(self.service_for(user), feed)
            .await
            .expect("session should open")
    }
}

impl Default for TestBoard {
    fn default() -> Self {
        Self::new()
    }
}

pub fn idea_input() -> NewIdea {
    NewIdea {
        title: Sentence(2..6).fake(),
        description: Paragraph(1..3).fake(),
        category: IdeaCategory::Feature,
        image: None,
    }
}

pub fn comment_input() -> NewComment {
    NewComment {
        content: Sentence(3..8).fake(),
        image: None,
    }
}

/// Merges feed events into the session until it has been idle for a
/// moment. Returns the changes in arrival order.
pub async fn drain(session: &mut BoardSession) -> Vec<SessionChange> {
    let mut changes = Vec::new();
    while let Ok(Ok(change)) =
        tokio::time::timeout(Duration::from_millis(50), session.next_change()).await
    {
        changes.push(change);
    }
    changes
}
