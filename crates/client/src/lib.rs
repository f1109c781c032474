//! # client
//!
//! The client-side half of the board: an owned, synchronous reconciliation
//! state plus the session object that keeps it current from the change
//! feed and runs the optimistic mutation paths.

pub mod session;
pub mod state;

pub use session::*;
pub use state::*;
