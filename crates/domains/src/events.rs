//! # Change-Feed Events
//!
//! Row-level mutation events pushed to every subscribed client, including
//! the writer's own session. Rows travel fully typed; a delete carries the
//! row as it was at deletion time.

use serde::{Deserialize, Serialize};

use crate::models::{Comment, Idea, VoteEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// The entity tables a client can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Ideas,
    Comments,
    Votes,
}

/// Typed row payload carried by a change event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableRow {
    Idea(Idea),
    Comment(Comment),
    Vote(VoteEntry),
}

/// A committed row mutation on `table`.
///
/// Delivery is at-least-once. Ordering is only guaranteed per row from a
/// single writer; consumers must merge idempotently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub op: ChangeOp,
    pub table: TableKind,
    pub row: TableRow,
}

impl ChangeEvent {
    pub fn insert(table: TableKind, row: TableRow) -> Self {
        Self { op: ChangeOp::Insert, table, row }
    }

    pub fn update(table: TableKind, row: TableRow) -> Self {
        Self { op: ChangeOp::Update, table, row }
    }

    pub fn delete(table: TableKind, row: TableRow) -> Self {
        Self { op: ChangeOp::Delete, table, row }
    }
}
