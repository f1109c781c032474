//! # BoardError
//!
//! Centralized error handling for the board engine.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all board operations.
#[derive(Error, Debug)]
pub enum BoardError {
    /// Resource not found (e.g., a vote against a since-deleted idea).
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// Validation failure (e.g., empty title, comment over the limit).
    #[error("validation error: {0}")]
    Validation(String),

    /// Identity/ownership failure (no signed-in user, delete by non-author).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource already exists (e.g., duplicate idea id on insert).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (store or feed unavailable). The action may
    /// be retried by the user; nothing retries automatically.
    #[error("transient store error: {0}")]
    Transient(String),
}

/// A specialized Result type for board logic.
pub type Result<T> = std::result::Result<T, BoardError>;

/// Failure modes of a change-feed subscription.
///
/// Both variants mean the subscriber's view has a gap of unknown size; the
/// correct recovery is a full snapshot refetch, not a replay.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedError {
    /// The subscriber fell behind; carries the number of dropped events.
    #[error("subscription lagged, {0} events missed")]
    Lagged(u64),

    #[error("change feed closed")]
    Closed,
}
