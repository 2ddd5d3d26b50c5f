//! Per-user store registry.
//!
//! [`ContactsRegistry`] hands out exactly one [`InMemoryContactStore`] per
//! user id. Stores are created on first access and then reused for the
//! lifetime of the registry; different users never share a store.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{ContactsResult, ValidationError};
use crate::storage::{ContactStore, InMemoryContactStore};

/// Maps user ids to their contact stores.
#[derive(Debug, Default)]
pub struct ContactsRegistry {
    stores: RwLock<HashMap<String, Arc<InMemoryContactStore>>>,
}

impl ContactsRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the store for `user_id`, creating it on first use.
    ///
    /// Repeated calls with the same user id return the same store.
    ///
    /// # Errors
    /// - `BadRequest`: `user_id` is blank
    pub fn get_or_create(&self, user_id: &str) -> ContactsResult<Arc<InMemoryContactStore>> {
        if user_id.trim().is_empty() {
            return Err(ValidationError::BlankUserId.into());
        }

        if let Some(store) = self.get(user_id) {
            return Ok(store);
        }

        let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have created it between the two locks.
        let store = stores
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(InMemoryContactStore::new(user_id)));
        Ok(Arc::clone(store))
    }

    /// Returns the store for `user_id` if one has been created.
    #[must_use]
    pub fn get(&self, user_id: &str) -> Option<Arc<InMemoryContactStore>> {
        let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
        stores.get(user_id).cloned()
    }

    /// User ids that have a store, sorted.
    #[must_use]
    pub fn user_ids(&self) -> Vec<String> {
        let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<String> = stores.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Clears every user's contacts, returning how many were removed.
    ///
    /// Stores stay registered so handles already given out remain valid.
    pub fn clear_all(&self) -> usize {
        let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
        stores.values().map(|store| store.clear()).sum()
    }
}
