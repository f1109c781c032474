//! # storage-adapters
//!
//! In-process implementations of the board's persistence and feed ports:
//! [`MemoryStore`] for the record tables, [`FeedHub`] for the realtime
//! change feed, and [`MemoryMediaStore`] for blob hosting.

pub mod feed;
pub mod media;
pub mod memory;

pub use feed::FeedHub;
pub use media::MemoryMediaStore;
pub use memory::MemoryStore;
