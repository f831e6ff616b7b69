// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Local mirror of a watched collection with exactly-once change notifications.

use crate::cache::{
    ChangeEvent, EventKind, Observer, ObserverRegistry, RawWatchEvent, ResourceKey,
    ResourceRecord, Store, SubscriptionHandle, VersionToken,
};
use crate::error::{InformerError, Result};
use kube::Resource;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Mirror of a remote collection, kept current from a watch stream.
///
/// This is the single writer: every mutation takes `&mut self`, so event
/// application and resync are serialized by construction. Readers go through
/// [`Store`] handles obtained from [`WatchCache::reader`].
pub struct WatchCache<K> {
    store: Store<K>,
    observers: ObserverRegistry<K>,
    started: bool,
}

impl<K> Default for WatchCache<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> WatchCache<K> {
    pub fn new() -> Self {
        Self {
            store: Store::new(),
            observers: ObserverRegistry::new(),
            started: false,
        }
    }

    pub fn reader(&self) -> Store<K> {
        self.store.clone()
    }

    pub fn registry(&self) -> ObserverRegistry<K> {
        self.observers.clone()
    }

    pub fn subscribe(&self, observer: impl Observer<K> + 'static) -> SubscriptionHandle {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        self.observers.unsubscribe(handle)
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn last_version(&self) -> VersionToken {
        self.store.last_version()
    }

    /// Advance the resume bookmark without touching any record
    pub fn bookmark(&mut self, version: impl Into<VersionToken>) -> Result<()> {
        self.ensure_started()?;
        let mut state = self.store.write();
        state.last_version = std::mem::take(&mut state.last_version).newest(version.into());
        Ok(())
    }

    fn ensure_started(&self) -> Result<()> {
        if self.started {
            Ok(())
        } else {
            Err(InformerError::NotStarted)
        }
    }

    fn notify(&self, changes: Vec<ChangeEvent<K>>) {
        for change in &changes {
            self.observers.dispatch(change);
        }
    }
}

impl<K: Clone> WatchCache<K> {
    pub fn get(&self, key: &ResourceKey) -> Option<ResourceRecord<K>> {
        self.store.get(key)
    }

    pub fn list(&self) -> Vec<ResourceRecord<K>> {
        self.store.list()
    }

    /// Seed the cache from a full listing.
    ///
    /// Every listed object is announced to observers as added once the whole
    /// listing is stored.
    pub fn start(
        &mut self,
        initial: impl IntoIterator<Item = ResourceRecord<K>>,
        version: impl Into<VersionToken>,
    ) -> Result<()> {
        if self.started {
            return Err(InformerError::AlreadyStarted);
        }

        let added = {
            let mut state = self.store.write();
            for record in initial {
                state.records.insert(record.key.clone(), record);
            }
            state.last_version = version.into();
            self.started = true;

            let mut added: Vec<_> = state.records.values().cloned().map(ChangeEvent::Added).collect();
            added.sort_by(|a, b| a.key().cmp(b.key()));
            added
        };

        debug!(
            "Watch cache started with {} objects at version {}",
            added.len(),
            self.last_version()
        );
        self.notify(added);
        Ok(())
    }

    /// Replace the cache with a fresh listing after a watch could not resume.
    ///
    /// Only real differences are announced: objects that disappeared are
    /// deleted, new ones added, and ones whose version changed updated. A
    /// listed record with a malformed version for a key the cache already
    /// knows is stale; the cached record is kept.
    pub fn resync(
        &mut self,
        listing: impl IntoIterator<Item = ResourceRecord<K>>,
        as_of: impl Into<VersionToken>,
    ) -> Result<()> {
        self.ensure_started()?;

        let incoming: HashMap<ResourceKey, ResourceRecord<K>> = listing
            .into_iter()
            .map(|record| (record.key.clone(), record))
            .collect();
        let as_of = as_of.into();

        let changes = {
            let mut state = self.store.write();
            let mut previous = std::mem::take(&mut state.records);
            let mut tombstones = std::mem::take(&mut state.tombstones);
            let mut changes = Vec::new();

            for (key, new) in incoming {
                match previous.remove(&key) {
                    None => match tombstones.remove(&key) {
                        Some(gone) if new.version.is_malformed() => {
                            trace!(key = %key, version = %new.version, "Dropping stale listed record");
                            state.tombstones.insert(key, gone);
                        }
                        _ => {
                            changes.push(ChangeEvent::Added(new.clone()));
                            state.records.insert(key, new);
                        }
                    },
                    Some(old) if new.version.is_malformed() => {
                        trace!(key = %key, version = %new.version, "Keeping cached record over stale listing");
                        state.records.insert(key, old);
                    }
                    Some(old) if old.version != new.version => {
                        changes.push(ChangeEvent::Updated {
                            old,
                            new: new.clone(),
                        });
                        state.records.insert(key, new);
                    }
                    Some(_) => {
                        state.records.insert(key, new);
                    }
                }
            }
            for (key, old) in previous {
                state.tombstones.insert(key, old.version.clone().newest(as_of.clone()));
                changes.push(ChangeEvent::Deleted(old));
            }

            if !as_of.is_malformed() {
                state.last_version = as_of;
            }

            changes.sort_by(|a, b| a.key().cmp(b.key()));
            changes
        };

        debug!(
            "Resynced watch cache at version {}: {} changes",
            self.last_version(),
            changes.len()
        );
        self.notify(changes);
        Ok(())
    }
}

impl<K: Resource + Clone> WatchCache<K> {
    /// Apply one raw event from the watch stream.
    ///
    /// Events that are not strictly newer than what is cached for their key,
    /// and updates or deletes for unknown keys, are dropped without
    /// notification. An ADD for a cached key is handled as an update. An ADD
    /// for a deleted key must be newer than the delete.
    pub fn apply_event(&mut self, raw: RawWatchEvent<K>) -> Result<()> {
        self.ensure_started()?;

        let key = raw.key();
        let RawWatchEvent {
            kind,
            resource_version: version,
            object,
        } = raw;

        let change = {
            let mut state = self.store.write();
            let stored = state.records.get(&key).map(|r| r.version.clone());

            let change = match (kind, stored) {
                (EventKind::Add, None)
                    if state
                        .tombstones
                        .get(&key)
                        .map_or(true, |gone| version.is_newer_than(gone)) =>
                {
                    state.tombstones.remove(&key);
                    let record = ResourceRecord {
                        key: key.clone(),
                        version: version.clone(),
                        object,
                    };
                    state.records.insert(key.clone(), record.clone());
                    Some(ChangeEvent::Added(record))
                }
                (EventKind::Add | EventKind::Update, Some(stored)) if version.is_newer_than(&stored) => {
                    let new = ResourceRecord {
                        key: key.clone(),
                        version: version.clone(),
                        object,
                    };
                    state
                        .records
                        .insert(key.clone(), new.clone())
                        .map(|old| ChangeEvent::Updated { old, new })
                }
                (EventKind::Delete, Some(stored)) if version.is_newer_than(&stored) => {
                    state.tombstones.insert(key.clone(), version.clone());
                    state.records.remove(&key).map(ChangeEvent::Deleted)
                }
                _ => None,
            };

            if change.is_some() {
                state.last_version = std::mem::take(&mut state.last_version).newest(version.clone());
            }
            change
        };

        match change {
            Some(change) => self.notify(vec![change]),
            None => trace!(key = %key, kind = %kind, version = %version, "Dropping stale watch event"),
        }
        Ok(())
    }
}
