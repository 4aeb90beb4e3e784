//! Per-process User Store
//!
//! An ordered, in-memory sequence of `UserRecord`s. Each serving process builds
//! its own instance at startup and hands it to the router; nothing here is
//! shared with other processes, so two workers seeded from the same bootstrap
//! data diverge as soon as either one is written to.

use super::types::{UserDraft, UserId, UserRecord};

use parking_lot::RwLock;
use std::sync::Arc;

/// Static records every store starts from. Ids are generated per store.
const BOOTSTRAP_USERS: &[(&str, u64, &[&str])] = &[
    ("JohnDoe", 30, &["Reading", "Coding"]),
    ("AliceSmith", 25, &["Traveling", "Painting"]),
];

pub struct UserStore {
    users: RwLock<Vec<UserRecord>>,
}

impl UserStore {
    /// Creates an empty store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a store seeded with the bootstrap users, each with a fresh id.
    pub fn with_bootstrap_data() -> Arc<Self> {
        let store = Self::new();
        store
            .users
            .write()
            .extend(BOOTSTRAP_USERS.iter().map(|(username, age, hobbies)| UserRecord {
                id: UserId::new(),
                username: username.to_string(),
                age: (*age).into(),
                hobbies: hobbies.iter().map(|h| h.to_string()).collect(),
            }));

        store
    }

    /// Snapshot of every record in insertion order.
    pub fn list(&self) -> Vec<UserRecord> {
        self.users.read().clone()
    }

    pub fn get(&self, id: &UserId) -> Option<UserRecord> {
        self.users.read().iter().find(|user| &user.id == id).cloned()
    }

    pub fn contains(&self, id: &UserId) -> bool {
        self.users.read().iter().any(|user| &user.id == id)
    }

    /// Appends a new record under a freshly generated id.
    pub fn insert(&self, draft: UserDraft) -> UserRecord {
        let user = UserRecord::from_draft(UserId::new(), draft);
        self.users.write().push(user.clone());

        tracing::debug!("Stored user {}", user.id);

        user
    }

    /// Replaces the record at `id` in place, keeping its position and id.
    pub fn replace(&self, id: &UserId, draft: UserDraft) -> Option<UserRecord> {
        let mut users = self.users.write();
        let slot = users.iter_mut().find(|user| &user.id == id)?;
        *slot = UserRecord::from_draft(id.clone(), draft);

        tracing::debug!("Replaced user {}", id);

        Some(slot.clone())
    }

    pub fn remove(&self, id: &UserId) -> Option<UserRecord> {
        let mut users = self.users.write();
        let index = users.iter().position(|user| &user.id == id)?;

        tracing::debug!("Removed user {}", id);

        Some(users.remove(index))
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
        }
    }
}
