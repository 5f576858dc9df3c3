//! Explicit read-through cache of request listings, keyed by owner
//!
//! Replaces the ambient client-side mirror of the store: entries exist
//! only for owners whose listing was read, and every mutation for an
//! owner drops that owner's entry so the next read goes back to the
//! store.
use std::collections::HashMap;
use std::sync::Mutex;

use crate::request::CdtRequest;

#[derive(Debug, Default)]
pub struct OwnerCache {
    entries: Mutex<HashMap<String, Vec<CdtRequest>>>,
}

impl OwnerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, owner_id: &str) -> Option<Vec<CdtRequest>> {
        self.lock().get(owner_id).cloned()
    }

    pub fn store(&self, owner_id: &str, requests: Vec<CdtRequest>) {
        self.lock().insert(owner_id.to_string(), requests);
    }

    pub fn invalidate(&self, owner_id: &str) {
        self.lock().remove(owner_id);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<CdtRequest>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
