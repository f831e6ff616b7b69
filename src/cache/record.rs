// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cached records, raw watch events and the change notifications derived from them

use crate::cache::{ResourceKey, VersionToken};
use kube::{Resource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Last known full representation of an object together with its version.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRecord<K> {
    pub key: ResourceKey,
    pub version: VersionToken,
    pub object: K,
}

impl<K: Resource> ResourceRecord<K> {
    /// Key and version are taken from the object's metadata
    pub fn from_obj(object: K) -> Self {
        Self {
            key: ResourceKey::from_obj(&object),
            version: object.resource_version().into(),
            object,
        }
    }
}

/// Kind of change carried by a [`RawWatchEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "ADDED")]
    Add,
    #[serde(rename = "MODIFIED")]
    Update,
    #[serde(rename = "DELETED")]
    Delete,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventKind::Add => "ADDED",
            EventKind::Update => "MODIFIED",
            EventKind::Delete => "DELETED",
        })
    }
}

/// A single event as delivered by the watch stream.
///
/// Wire shape: `{"kind": "ADDED", "resourceVersion": "42", "object": {...}}`.
/// A DELETED object may be a tombstone carrying little more than its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWatchEvent<K> {
    pub kind: EventKind,
    #[serde(default)]
    pub resource_version: VersionToken,
    pub object: K,
}

impl<K: Resource> RawWatchEvent<K> {
    /// Build an event whose version is taken from the object's metadata
    pub fn new(kind: EventKind, object: K) -> Self {
        Self {
            kind,
            resource_version: object.resource_version().into(),
            object,
        }
    }

    pub fn key(&self) -> ResourceKey {
        ResourceKey::from_obj(&self.object)
    }
}

/// A committed transition of the cache, as handed to observers.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent<K> {
    Added(ResourceRecord<K>),
    Updated {
        old: ResourceRecord<K>,
        new: ResourceRecord<K>,
    },
    Deleted(ResourceRecord<K>),
}

impl<K> ChangeEvent<K> {
    pub fn key(&self) -> &ResourceKey {
        match self {
            ChangeEvent::Added(record) | ChangeEvent::Deleted(record) => &record.key,
            ChangeEvent::Updated { new, .. } => &new.key,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChangeEvent::Added(_) => "added",
            ChangeEvent::Updated { .. } => "updated",
            ChangeEvent::Deleted(_) => "deleted",
        }
    }
}
