use std::{
    collections::{hash_map::Entry, HashMap},
    sync::{PoisonError, RwLock},
};

use crate::entities::{GeoLocation, NormalizedKey};

#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry {
    Found(GeoLocation),
    /// The provider has no match for this key.
    NotFound,
}

/// Session-wide store of geocoding results.
///
/// Entries are written once and never replaced or evicted.
/// Transport failures must not be stored here.
#[derive(Debug, Default)]
pub struct GeocodeCache {
    entries: RwLock<HashMap<NormalizedKey, CacheEntry>>,
}

impl GeocodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &NormalizedKey) -> Option<CacheEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Inserts the entry if the key is still absent.
    ///
    /// Returns `false` if an entry already existed, which is then kept.
    pub fn put(&self, key: NormalizedKey, entry: CacheEntry) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.entry(key) {
            Entry::Occupied(occupied) => {
                log::debug!("Keep existing cache entry for '{}'", occupied.key());
                false
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
