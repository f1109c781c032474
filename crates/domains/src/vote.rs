//! # Vote Transitions
//!
//! The single implementation of the cast-vote state machine. Both the
//! authoritative store path and the client's optimistic path go through
//! [`transition`], so the two computations cannot drift.

use crate::models::VoteDirection;

/// Result of casting a vote against the caller's existing ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTransition {
    /// The ledger entry after the cast; `None` removes the entry.
    pub next: Option<VoteDirection>,
    /// Adjustment to the idea's denormalized `votes` counter.
    pub delta: i64,
}

/// Computes the ledger mutation and counter adjustment for one cast.
///
/// - No existing entry: insert `requested`, counter moves one step.
/// - Same direction again: the entry toggles off, undoing its contribution.
/// - Opposite direction: the entry flips, counter moves two steps (old
///   contribution removed and new one added in a single adjustment).
pub fn transition(existing: Option<VoteDirection>, requested: VoteDirection) -> VoteTransition {
    match existing {
        None => VoteTransition {
            next: Some(requested),
            delta: requested.weight(),
        },
        Some(current) if current == requested => VoteTransition {
            next: None,
            delta: -requested.weight(),
        },
        Some(_) => VoteTransition {
            next: Some(requested),
            delta: 2 * requested.weight(),
        },
    }
}

impl VoteTransition {
    /// The transition that undoes `self`, given the direction that was in
    /// place before `self` was applied. Used by the optimistic rollback.
    pub fn inverse(&self, previous: Option<VoteDirection>) -> VoteTransition {
        VoteTransition {
            next: previous,
            delta: -self.delta,
        }
    }
}
