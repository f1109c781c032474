//! # auth-adapters
//!
//! Process-local implementations of the identity and member-directory
//! ports. A real deployment fronts the external auth provider here; the
//! board itself only ever asks for the current user id and for display
//! profiles.

use std::sync::RwLock;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use domains::error::Result;
use domains::models::MemberProfile;
use domains::ports::{Identity, MemberDirectory};

/// Identity of one client process: whoever is signed in on this device.
pub struct SessionIdentity {
    current: RwLock<Option<Uuid>>,
}

impl SessionIdentity {
    pub fn signed_in(user_id: Uuid) -> Self {
        Self { current: RwLock::new(Some(user_id)) }
    }

    pub fn anonymous() -> Self {
        Self { current: RwLock::new(None) }
    }

    pub fn sign_in(&self, user_id: Uuid) {
        if let Ok(mut current) = self.current.write() {
            debug!(user = %user_id, "user signed in");
            *current = Some(user_id);
        }
    }

    pub fn sign_out(&self) {
        if let Ok(mut current) = self.current.write() {
            *current = None;
        }
    }
}

impl Identity for SessionIdentity {
    fn current_user(&self) -> Option<Uuid> {
        self.current.read().ok().and_then(|current| *current)
    }
}

/// Member directory backed by a concurrent map; seeded by whatever signs
/// members up (out of scope for the board itself).
#[derive(Default)]
pub struct InMemoryDirectory {
    profiles: DashMap<Uuid, MemberProfile>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, profile: MemberProfile) {
        self.profiles.insert(profile.user_id, profile);
    }
}

#[async_trait]
impl MemberDirectory for InMemoryDirectory {
    async fn profile(&self, user_id: Uuid) -> Result<Option<MemberProfile>> {
        Ok(self.profiles.get(&user_id).map(|entry| entry.clone()))
    }
}
