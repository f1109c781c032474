//! Controller-level behavior: validation, identity gating, authorization,
//! snapshots, and the delete cascade.

use bytes::Bytes;
use uuid::Uuid;

use domains::error::BoardError;
use domains::models::{IdeaCategory, VoteDirection};
use domains::ports::{CommentRepo, VoteRepo};
use integration_tests::{comment_input, drain, idea_input, TestBoard};
use services::board::{NewComment, NewIdea};

#[tokio::test]
async fn ideas_list_newest_first() {
    let board = TestBoard::new();
    let service = board.service_for(board.member("Ana"));

    let first = service.create_idea(idea_input()).await.unwrap();
    let second = service.create_idea(idea_input()).await.unwrap();

    let snapshot = service.snapshot().await.unwrap();
    let ids: Vec<Uuid> = snapshot.ideas.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn blank_input_is_rejected_with_validation_errors() {
    let board = TestBoard::new();
    let service = board.service_for(board.member("Ana"));

    let blank_title = NewIdea {
        title: "  ".into(),
        description: "something".into(),
        category: IdeaCategory::Bug,
        image: None,
    };
    assert!(matches!(
        service.create_idea(blank_title).await.unwrap_err(),
        BoardError::Validation(_)
    ));

    let idea = service.create_idea(idea_input()).await.unwrap();
    let blank_comment = NewComment { content: "\n\t ".into(), image: None };
    assert!(matches!(
        service.add_comment(idea.id, blank_comment).await.unwrap_err(),
        BoardError::Validation(_)
    ));
}

#[tokio::test]
async fn anonymous_callers_cannot_mutate() {
    let board = TestBoard::new();
    let service = board.anonymous_service();

    assert!(matches!(
        service.create_idea(idea_input()).await.unwrap_err(),
        BoardError::Unauthorized(_)
    ));
    assert!(matches!(
        service.cast_vote(Uuid::now_v7(), VoteDirection::Up).await.unwrap_err(),
        BoardError::Unauthorized(_)
    ));
}

#[tokio::test]
async fn only_the_author_may_delete_and_children_survive_a_rejection() {
    let board = TestBoard::new();
    let ana = board.member("Ana");
    let bruno = board.member("Bruno");
    let ana_service = board.service_for(ana);
    let bruno_service = board.service_for(bruno);

    let idea = ana_service.create_idea(idea_input()).await.unwrap();
    bruno_service.add_comment(idea.id, comment_input()).await.unwrap();
    bruno_service.cast_vote(idea.id, VoteDirection::Up).await.unwrap();

    let err = bruno_service.delete_idea(idea.id).await.unwrap_err();
    assert!(matches!(err, BoardError::Unauthorized(_)));
    // rejection left the idea and its children untouched
    let snapshot = bruno_service.snapshot().await.unwrap();
    assert_eq!(snapshot.ideas.len(), 1);
    assert_eq!(snapshot.comments[&idea.id].len(), 1);
    assert_eq!(snapshot.my_votes[&idea.id], VoteDirection::Up);

    ana_service.delete_idea(idea.id).await.unwrap();
    assert!(ana_service.snapshot().await.unwrap().ideas.is_empty());
}

#[tokio::test]
async fn deleting_an_idea_cascades_votes_and_comments() {
    let board = TestBoard::new();
    let ana = board.member("Ana");
    let bruno = board.member("Bruno");
    let ana_service = board.service_for(ana);
    let bruno_service = board.service_for(bruno);

    let idea = ana_service.create_idea(idea_input()).await.unwrap();
    for service in [&ana_service, &bruno_service] {
        service.add_comment(idea.id, comment_input()).await.unwrap();
        service.cast_vote(idea.id, VoteDirection::Up).await.unwrap();
    }

    ana_service.delete_idea(idea.id).await.unwrap();

    assert!(board.store.list_oldest_first(idea.id).await.unwrap().is_empty());
    assert!(board.store.for_user(ana).await.unwrap().is_empty());
    assert!(board.store.for_user(bruno).await.unwrap().is_empty());
}

#[tokio::test]
async fn snapshot_joins_author_profiles_and_orders_comments_chronologically() {
    let board = TestBoard::new();
    let ana = board.member("Ana");
    let bruno = board.member("Bruno");
    let ana_service = board.service_for(ana);
    let bruno_service = board.service_for(bruno);

    let idea = ana_service.create_idea(idea_input()).await.unwrap();
    let first = bruno_service.add_comment(idea.id, comment_input()).await.unwrap();
    let second = ana_service.add_comment(idea.id, comment_input()).await.unwrap();

    let snapshot = bruno_service.snapshot().await.unwrap();
    assert_eq!(snapshot.authors[&ana].display_name, "Ana");
    let ids: Vec<Uuid> = snapshot.comments[&idea.id].iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[tokio::test]
async fn uploaded_images_land_as_public_urls() {
    let board = TestBoard::new();
    let service = board.service_for(board.member("Ana"));

    let idea = service
        .create_idea(NewIdea {
            image: Some((Bytes::from_static(b"court photo"), mime::IMAGE_JPEG)),
            ..idea_input()
        })
        .await
        .unwrap();

    let url = idea.image_url.expect("image url should be set");
    assert_eq!(
        board.media.fetch(&url).expect("blob should resolve"),
        Bytes::from_static(b"court photo")
    );
}

#[tokio::test]
async fn feed_subscribers_see_service_mutations() {
    let board = TestBoard::new();
    let ana = board.member("Ana");
    let mut session = board.session_for(ana).await;
    let service = board.service_for(board.member("Bruno"));

    let idea = service.create_idea(idea_input()).await.unwrap();
    let changes = drain(&mut session).await;
    assert!(!changes.is_empty());
    assert_eq!(session.state().ideas()[0].id, idea.id);
}
