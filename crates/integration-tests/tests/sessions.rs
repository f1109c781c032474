//! Session lifecycle: open rebuilds from the store, lag forces a snapshot
//! resync, and close tears the subscriptions down.

use client::SessionChange;
use domains::models::VoteDirection::Up;
use integration_tests::{comment_input, drain, idea_input, TestBoard};

#[tokio::test]
async fn open_rebuilds_existing_state_from_the_store() {
    let board = TestBoard::new();
    let ana = board.member("Ana");
    let service = board.service_for(ana);

    let idea = service.create_idea(idea_input()).await.unwrap();
    service.cast_vote(idea.id, Up).await.unwrap();
    service.add_comment(idea.id, comment_input()).await.unwrap();

    let session = board.session_for(ana).await;
    let row = session.state().idea(idea.id).expect("idea loaded at open");
    assert_eq!(row.votes, 1);
    assert_eq!(session.state().my_vote(idea.id), Some(Up));
    assert_eq!(session.state().comments_for(idea.id).len(), 1);
}

#[tokio::test]
async fn a_feed_gap_triggers_a_full_resync() {
    let board = TestBoard::with_feed_buffer(1);
    let ana = board.member("Ana");
    let mut session = board.session_for(ana).await;
    let writer = board.service_for(board.member("Bruno"));

    // enough unpumped inserts to overflow the one-slot buffer
    for _ in 0..5 {
        writer.create_idea(idea_input()).await.unwrap();
    }

    let change = session.next_change().await.unwrap();
    assert_eq!(change, SessionChange::Resynced);
    // the rebuilt state matches the authoritative store despite the gap
    assert_eq!(session.state().ideas().len(), 5);
}

#[tokio::test]
async fn events_after_a_resync_keep_merging() {
    let board = TestBoard::with_feed_buffer(1);
    let ana = board.member("Ana");
    let mut session = board.session_for(ana).await;
    let writer = board.service_for(board.member("Bruno"));

    for _ in 0..3 {
        writer.create_idea(idea_input()).await.unwrap();
    }
    assert_eq!(session.next_change().await.unwrap(), SessionChange::Resynced);

    let late = writer.create_idea(idea_input()).await.unwrap();
    drain(&mut session).await;
    assert_eq!(session.state().ideas()[0].id, late.id);
}

#[tokio::test]
async fn close_consumes_the_session() {
    let board = TestBoard::new();
    let ana = board.member("Ana");
    let session = board.session_for(ana).await;
    session.close();

    // a fresh session opens cleanly afterwards
    let again = board.session_for(ana).await;
    assert!(again.state().ideas().is_empty());
    again.close();
}
