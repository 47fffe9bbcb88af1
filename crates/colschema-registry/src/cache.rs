//! # Schema Cache
//!
//! Process-lifetime memoization of decoded schemas, keyed by
//! `<category>_<name>_<version>`.
//!
//! ## Single-flight loading
//!
//! The outer map lock is held only long enough to find or create the
//! per-key slot. The slot's own lock is held while the schema loads, so
//! concurrent first requests for one key perform exactly one store read
//! and every waiter receives the same `Arc`. Requests for other keys
//! proceed in parallel.
//!
//! Entries are write-once: nothing is evicted, refreshed or mutated after
//! insertion. A failed load stores nothing, and its empty slot is removed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use colschema_core::ComponentIdentity;
use parking_lot::Mutex;

use crate::document::ComponentSchema;
use crate::error::RegistryError;

type Slot = Arc<Mutex<Option<Arc<ComponentSchema>>>>;

/// Memoizes decoded [`ComponentSchema`] values.
#[derive(Debug, Default)]
pub struct SchemaCache {
    slots: Mutex<HashMap<String, Slot>>,
    filled: AtomicUsize,
}

impl SchemaCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached schema for `identity`, running `load` on a miss.
    ///
    /// `load` runs at most once per key across all threads unless it
    /// fails, in which case the next caller retries.
    pub fn get_or_load<F>(
        &self,
        identity: &ComponentIdentity,
        load: F,
    ) -> Result<Arc<ComponentSchema>, RegistryError>
    where
        F: FnOnce() -> Result<ComponentSchema, RegistryError>,
    {
        let key = identity.cache_key();
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        let mut guard = slot.lock();
        if let Some(schema) = guard.as_ref() {
            tracing::debug!(key = %key, "schema cache hit");
            return Ok(Arc::clone(schema));
        }

        tracing::debug!(key = %key, "schema cache miss");
        match load() {
            Ok(schema) => {
                let schema = Arc::new(schema);
                *guard = Some(Arc::clone(&schema));
                self.filled.fetch_add(1, Ordering::Release);
                Ok(schema)
            }
            Err(e) => {
                drop(guard);
                self.discard_empty(&key, &slot);
                Err(e)
            }
        }
    }

    /// The cached schema for `identity`, without loading.
    pub fn get(&self, identity: &ComponentIdentity) -> Option<Arc<ComponentSchema>> {
        let slot = self.slots.lock().get(&identity.cache_key()).cloned()?;
        let guard = slot.lock();
        guard.clone()
    }

    /// Number of schemas held.
    ///
    /// Never waits on a load in progress; slots are filled at most once, so
    /// a running count is exact.
    pub fn len(&self) -> usize {
        self.filled.load(Ordering::Acquire)
    }

    /// Whether no schema is held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn discard_empty(&self, key: &str, slot: &Slot) {
        let mut slots = self.slots.lock();
        let still_ours = slots
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot));
        // A waiter may have filled the slot after we released it.
        if still_ours && slot.lock().is_none() {
            slots.remove(key);
        }
    }
}
