//! # MemoryMediaStore
//!
//! Blob hosting behind the `MediaStorage` port: keeps uploads in a
//! concurrent map and hands back `mem://` URLs. Enough for tests and the
//! demo binary; an S3-backed twin would slot in behind the same port.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use mime::Mime;
use tracing::debug;
use uuid::Uuid;

use domains::error::{BoardError, Result};
use domains::ports::MediaStorage;

pub struct MemoryMediaStore {
    blobs: DashMap<Uuid, (Mime, Bytes)>,
    max_bytes: usize,
}

impl MemoryMediaStore {
    pub fn new(max_bytes: usize) -> Self {
        Self { blobs: DashMap::new(), max_bytes }
    }

    /// Resolves a URL previously returned by `upload`.
    pub fn fetch(&self, url: &str) -> Option<Bytes> {
        let id: Uuid = url.strip_prefix("mem://")?.parse().ok()?;
        self.blobs.get(&id).map(|entry| entry.1.clone())
    }
}

#[async_trait]
impl MediaStorage for MemoryMediaStore {
    async fn upload(&self, data: Bytes, content_type: Mime) -> Result<String> {
        if data.is_empty() {
            return Err(BoardError::Validation("upload is empty".into()));
        }
        if data.len() > self.max_bytes {
            return Err(BoardError::Validation(format!(
                "upload exceeds {} bytes",
                self.max_bytes
            )));
        }
        let id = Uuid::now_v7();
        debug!(blob = %id, bytes = data.len(), mime = %content_type, "blob stored");
        self.blobs.insert(id, (content_type, data));
        Ok(format!("mem://{id}"))
    }
}
