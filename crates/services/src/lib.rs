//! # services
//!
//! Orchestration over the domain ports: the board controller that every
//! client session routes its mutations through.

pub mod board;

pub use board::*;
