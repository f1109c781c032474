//! # domains
//!
//! The central domain logic and interface definitions for the idea
//! feedback board: models, error taxonomy, change-feed events, ports, and
//! the shared vote-transition arithmetic.

pub mod error;
pub mod events;
pub mod models;
pub mod ports;
pub mod vote;

// Re-exporting for easier access in other crates
pub use error::*;
pub use events::*;
pub use models::*;
pub use ports::*;
pub use vote::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use uuid::Uuid;

    #[test]
    fn test_idea_creation_v7() {
        let id = Uuid::now_v7();
        let idea = Idea {
            id,
            author_id: Uuid::now_v7(),
            title: "Player levels".to_string(),
            description: "Rank members by matches played".to_string(),
            category: IdeaCategory::Feature,
            image_url: None,
            votes: 0,
            status: IdeaStatus::default(),
            created_at: chrono::Utc::now(),
        };
        assert_eq!(idea.id, id);
        assert_eq!(idea.status, IdeaStatus::Pending);
        assert_eq!(idea.votes, 0);
    }
}
