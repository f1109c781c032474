//! # ideaboard
//!
//! Demo driver for the board engine: one shared in-memory store, two
//! member sessions trading ideas, votes, and comments, with every merge
//! visible through tracing.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use auth_adapters::{InMemoryDirectory, SessionIdentity};
use client::BoardSession;
use configs::BoardConfig;
use domains::models::{IdeaCategory, MemberProfile, VoteDirection};
use domains::ports::ChangeFeed;
use services::board::{BoardPorts, BoardService, Limits, NewComment, NewIdea};
use storage_adapters::{FeedHub, MemoryMediaStore, MemoryStore};

/// Builds a board service for one signed-in member over the shared
/// adapters, the way a host application would per connected client.
fn service_for(
    user: Uuid,
    store: &Arc<MemoryStore>,
    directory: &Arc<InMemoryDirectory>,
    media: &Arc<MemoryMediaStore>,
    limits: Limits,
) -> Arc<BoardService> {
    Arc::new(BoardService::new(
        BoardPorts {
            ideas: store.clone(),
            comments: store.clone(),
            votes: store.clone(),
            identity: Arc::new(SessionIdentity::signed_in(user)),
            directory: directory.clone(),
            media: media.clone(),
        },
        limits,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let cfg = BoardConfig::load()?;

    // Shared backend: one store, one feed, one directory.
    let feed: Arc<FeedHub> = Arc::new(FeedHub::new(cfg.feed_buffer));
    let store = Arc::new(MemoryStore::new(feed.clone()));
    let directory = Arc::new(InMemoryDirectory::new());
    let media = Arc::new(MemoryMediaStore::new(cfg.max_upload_bytes));

    let ana = Uuid::now_v7();
    let bruno = Uuid::now_v7();
    directory.upsert(MemberProfile {
        user_id: ana,
        display_name: "Ana".into(),
        avatar_url: None,
        city: "Rosario".into(),
    });
    directory.upsert(MemberProfile {
        user_id: bruno,
        display_name: "Bruno".into(),
        avatar_url: None,
        city: "Córdoba".into(),
    });

    let limits = Limits {
        max_title: cfg.max_title_chars,
        max_description: cfg.max_description_chars,
        max_comment: cfg.max_comment_chars,
    };
    let feed_port: Arc<dyn ChangeFeed> = feed.clone();
    let mut ana_session = BoardSession::open(
        service_for(ana, &store, &directory, &media, limits.clone()),
        feed_port.clone(),
    )
    .await?;
    let mut bruno_session = BoardSession::open(
        service_for(bruno, &store, &directory, &media, limits),
        feed_port,
    )
    .await?;

    // Ana posts an idea; both sessions pick the insert up from the feed.
    let idea = ana_session
        .create_idea(NewIdea {
            title: "Night matches".into(),
            description: "Open the courts after 22:00 with lighting".into(),
            category: IdeaCategory::Feature,
            image: None,
        })
        .await?;
    ana_session.next_change().await?;
    bruno_session.next_change().await?;

    // Bruno votes up, Ana follows, then changes her mind.
    bruno_session.vote(idea.id, VoteDirection::Up).await?;
    ana_session.vote(idea.id, VoteDirection::Up).await?;
    ana_session.vote(idea.id, VoteDirection::Down).await?;
    for _ in 0..3 {
        ana_session.next_change().await?;
        bruno_session.next_change().await?;
    }

    bruno_session
        .add_comment(
            idea.id,
            NewComment { content: "Lighting is half the cost, still worth it".into(), image: None },
        )
        .await?;
    ana_session.next_change().await?;
    bruno_session.next_change().await?;

    for row in ana_session.state().ideas() {
        tracing::info!(
            title = %row.title,
            votes = row.votes,
            comments = ana_session.state().comments_for(row.id).len(),
            my_vote = ?ana_session.state().my_vote(row.id),
            "ana's view"
        );
    }
    for row in bruno_session.state().ideas() {
        tracing::info!(
            title = %row.title,
            votes = row.votes,
            comments = bruno_session.state().comments_for(row.id).len(),
            my_vote = ?bruno_session.state().my_vote(row.id),
            "bruno's view"
        );
    }

    ana_session.close();
    bruno_session.close();
    Ok(())
}
