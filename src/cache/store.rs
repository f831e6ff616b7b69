// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The in-memory mirror and its shared read handle

use crate::cache::{ResourceKey, ResourceRecord, VersionToken};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Records by key plus the collection-wide bookmark the next watch resumes from.
#[derive(Debug)]
pub(crate) struct CacheStore<K> {
    pub(crate) records: HashMap<ResourceKey, ResourceRecord<K>>,
    /// Version at which each deleted key left the cache, until the next resync
    pub(crate) tombstones: HashMap<ResourceKey, VersionToken>,
    pub(crate) last_version: VersionToken,
}

impl<K> Default for CacheStore<K> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            tombstones: HashMap::new(),
            last_version: VersionToken::default(),
        }
    }
}

/// A readable view of a [`WatchCache`](crate::cache::WatchCache).
///
/// Cloning produces a new reference to the same backing store. Reads take a
/// copy under the lock, so they never observe a half-applied event.
#[derive(Debug)]
pub struct Store<K> {
    inner: Arc<RwLock<CacheStore<K>>>,
}

impl<K> Clone for Store<K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K> Store<K> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(CacheStore::default())),
        }
    }

    // Every mutation completes before its guard drops, so a poisoned lock still holds a consistent store
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, CacheStore<K>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, CacheStore<K>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().records.is_empty()
    }

    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.read().records.contains_key(key)
    }

    /// Bookmark a new watch session should resume from
    pub fn last_version(&self) -> VersionToken {
        self.read().last_version.clone()
    }
}

impl<K: Clone> Store<K> {
    /// Retrieve a clone of the record for `key`, if cached.
    ///
    /// This is a cache and may lag the cluster.
    pub fn get(&self, key: &ResourceKey) -> Option<ResourceRecord<K>> {
        self.read().records.get(key).cloned()
    }

    /// Snapshot of all records, ordered by key
    pub fn list(&self) -> Vec<ResourceRecord<K>> {
        let mut records: Vec<_> = self.read().records.values().cloned().collect();
        records.sort_by(|a, b| a.key.cmp(&b.key));
        records
    }
}
