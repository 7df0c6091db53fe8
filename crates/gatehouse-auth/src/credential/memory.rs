//! Credential store held entirely in process memory.

use async_trait::async_trait;
use dashmap::DashMap;

use gatehouse_core::config::UserSeed;
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::CredentialStore;
use gatehouse_core::types::Principal;

/// In-memory credential store keyed by exact username.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    principals: DashMap<String, Principal>,
}

impl InMemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from configured user seeds.
    pub fn from_seeds(seeds: &[UserSeed]) -> Self {
        let store = Self::new();
        for seed in seeds {
            store.insert(Principal::new(
                seed.username.clone(),
                seed.password_hash.clone(),
                seed.roles.iter().cloned(),
            ));
        }
        store
    }

    /// Insert or replace a principal.
    pub fn insert(&self, principal: Principal) {
        self.principals.insert(principal.username.clone(), principal);
    }

    /// Remove a principal, returning it if present.
    pub fn remove(&self, username: &str) -> Option<Principal> {
        self.principals.remove(username).map(|(_, p)| p)
    }

    /// Number of stored principals.
    pub fn len(&self) -> usize {
        self.principals.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Principal>> {
        Ok(self.principals.get(username).map(|p| p.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_is_case_sensitive() {
        let store = InMemoryCredentialStore::new();
        store.insert(Principal::new("alice", "h", ["USER"]));

        assert!(store.find_by_username("alice").await.unwrap().is_some());
        assert!(store.find_by_username("Alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_from_seeds_and_remove() {
        let seeds = vec![UserSeed {
            username: "bob".into(),
            password_hash: "$argon2id$stub".into(),
            roles: vec!["ADMIN".into()],
        }];
        let store = InMemoryCredentialStore::from_seeds(&seeds);

        let bob = store.find_by_username("bob").await.unwrap().unwrap();
        assert!(bob.has_role("ADMIN"));
        assert_eq!(bob.credential_hash, "$argon2id$stub");

        assert!(store.remove("bob").is_some());
        assert!(store.is_empty());
    }
}
