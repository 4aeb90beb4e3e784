//! Users Module Tests
//!
//! Validates the per-process store: bootstrap seeding, ordered mutation and
//! the fact that two stores never see each other's writes.
//!
//! *Note: HTTP-level behaviour is covered in the server tests.*

#[cfg(test)]
mod tests {
    use crate::users::store::UserStore;
    use crate::users::types::{UserDraft, UserId};

    fn draft(username: &str, age: u64) -> UserDraft {
        UserDraft {
            username: username.to_string(),
            age: age.into(),
            hobbies: vec!["Chess".to_string()],
        }
    }

    // ============================================================
    // BOOTSTRAP
    // ============================================================

    #[test]
    fn test_bootstrap_seeds_two_users() {
        let store = UserStore::with_bootstrap_data();
        let users = store.list();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "JohnDoe");
        assert_eq!(users[0].age, serde_json::Number::from(30u64));
        assert_eq!(users[0].hobbies, vec!["Reading", "Coding"]);
        assert_eq!(users[1].username, "AliceSmith");
        assert_eq!(users[1].age, serde_json::Number::from(25u64));
        assert_ne!(users[0].id, users[1].id);
    }

    #[test]
    fn test_bootstrap_ids_are_generated_per_store() {
        let a = UserStore::with_bootstrap_data();
        let b = UserStore::with_bootstrap_data();

        // Same seed data, different identities.
        assert_eq!(a.list()[0].username, b.list()[0].username);
        assert_ne!(a.list()[0].id, b.list()[0].id);
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = UserStore::new();
        assert!(store.is_empty());
        assert!(store.list().is_empty());
    }

    // ============================================================
    // MUTATIONS
    // ============================================================

    #[test]
    fn test_insert_appends_with_fresh_id() {
        let store = UserStore::with_bootstrap_data();
        let user = store.insert(draft("X", 1));

        assert_eq!(store.len(), 3);
        assert_eq!(store.list().last().unwrap(), &user);
        assert!(UserId::parse(user.id.as_str()).is_ok());
        assert_eq!(store.get(&user.id), Some(user));
    }

    #[test]
    fn test_replace_keeps_id_and_position() {
        let store = UserStore::with_bootstrap_data();
        let first = store.list()[0].clone();

        let updated = store.replace(&first.id, draft("Renamed", 31)).unwrap();

        assert_eq!(updated.id, first.id);
        assert_eq!(updated.username, "Renamed");
        assert_eq!(updated.hobbies, vec!["Chess"]);
        assert_eq!(store.list()[0], updated);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_remove_deletes_only_target() {
        let store = UserStore::with_bootstrap_data();
        let users = store.list();

        let removed = store.remove(&users[0].id).unwrap();

        assert_eq!(removed, users[0]);
        assert_eq!(store.list(), vec![users[1].clone()]);
        assert!(store.get(&users[0].id).is_none());
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let store = UserStore::with_bootstrap_data();
        let unknown = UserId::new();

        assert!(store.get(&unknown).is_none());
        assert!(!store.contains(&unknown));
        assert!(store.replace(&unknown, draft("X", 1)).is_none());
        assert!(store.remove(&unknown).is_none());
        assert_eq!(store.len(), 2);
    }

    // ============================================================
    // ISOLATION
    // ============================================================

    #[test]
    fn test_stores_diverge_after_first_write() {
        let worker_a = UserStore::with_bootstrap_data();
        let worker_b = UserStore::with_bootstrap_data();

        let created = worker_a.insert(draft("X", 1));

        assert!(worker_a.contains(&created.id));
        assert!(!worker_b.contains(&created.id));
        assert_eq!(worker_a.len(), 3);
        assert_eq!(worker_b.len(), 2);
    }
}
