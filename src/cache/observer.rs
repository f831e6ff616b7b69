// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Observer callbacks and the registry that dispatches change events to them

use crate::cache::{ChangeEvent, ResourceRecord};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::error;

/// Receives committed cache transitions.
///
/// Callbacks run inline on the ingestion lane, so a slow observer delays every
/// following event. Returning an error (or panicking) only affects this observer.
pub trait Observer<K>: Send + Sync {
    fn on_add(&self, _record: &ResourceRecord<K>) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_update(&self, _old: &ResourceRecord<K>, _new: &ResourceRecord<K>) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_delete(&self, _record: &ResourceRecord<K>) -> anyhow::Result<()> {
        Ok(())
    }
}

type AddFn<K> = Box<dyn Fn(&ResourceRecord<K>) -> anyhow::Result<()> + Send + Sync>;
type UpdateFn<K> = Box<dyn Fn(&ResourceRecord<K>, &ResourceRecord<K>) -> anyhow::Result<()> + Send + Sync>;
type DeleteFn<K> = Box<dyn Fn(&ResourceRecord<K>) -> anyhow::Result<()> + Send + Sync>;

/// Closure based observer; unset callbacks are no-ops.
pub struct ObserverFns<K> {
    add: Option<AddFn<K>>,
    update: Option<UpdateFn<K>>,
    delete: Option<DeleteFn<K>>,
}

impl<K> ObserverFns<K> {
    pub fn new() -> Self {
        Self {
            add: None,
            update: None,
            delete: None,
        }
    }

    pub fn on_add<F>(mut self, f: F) -> Self
    where
        F: Fn(&ResourceRecord<K>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.add = Some(Box::new(f));
        self
    }

    pub fn on_update<F>(mut self, f: F) -> Self
    where
        F: Fn(&ResourceRecord<K>, &ResourceRecord<K>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.update = Some(Box::new(f));
        self
    }

    pub fn on_delete<F>(mut self, f: F) -> Self
    where
        F: Fn(&ResourceRecord<K>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.delete = Some(Box::new(f));
        self
    }
}

impl<K> Default for ObserverFns<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Observer<K> for ObserverFns<K> {
    fn on_add(&self, record: &ResourceRecord<K>) -> anyhow::Result<()> {
        self.add.as_ref().map_or(Ok(()), |f| f(record))
    }

    fn on_update(&self, old: &ResourceRecord<K>, new: &ResourceRecord<K>) -> anyhow::Result<()> {
        self.update.as_ref().map_or(Ok(()), |f| f(old, new))
    }

    fn on_delete(&self, record: &ResourceRecord<K>) -> anyhow::Result<()> {
        self.delete.as_ref().map_or(Ok(()), |f| f(record))
    }
}

/// Identifies one registration; pass it back to [`ObserverRegistry::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

type Entry<K> = (SubscriptionHandle, Arc<dyn Observer<K>>);

/// Ordered list of observers, shared between the cache and anyone holding a clone.
pub struct ObserverRegistry<K> {
    observers: Arc<Mutex<Vec<Entry<K>>>>,
    next_id: Arc<AtomicU64>,
}

impl<K> Clone for ObserverRegistry<K> {
    fn clone(&self) -> Self {
        Self {
            observers: self.observers.clone(),
            next_id: self.next_id.clone(),
        }
    }
}

impl<K> Default for ObserverRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> ObserverRegistry<K> {
    pub fn new() -> Self {
        Self {
            observers: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Entry<K>>> {
        // Observers never run while the lock is held, so a poisoned lock still holds a valid list
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self, observer: impl Observer<K> + 'static) -> SubscriptionHandle {
        let handle = SubscriptionHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        let observer: Arc<dyn Observer<K>> = Arc::new(observer);
        self.entries().push((handle, observer));
        handle
    }

    /// Returns whether the handle was still registered
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|(h, _)| *h != handle);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Deliver an event to every observer registered when delivery starts, in
    /// registration order. Failures are logged and do not stop delivery.
    pub(crate) fn dispatch(&self, event: &ChangeEvent<K>) {
        let snapshot: Vec<Entry<K>> = self.entries().clone();

        for (handle, observer) in snapshot {
            let outcome = catch_unwind(AssertUnwindSafe(|| match event {
                ChangeEvent::Added(record) => observer.on_add(record),
                ChangeEvent::Updated { old, new } => observer.on_update(old, new),
                ChangeEvent::Deleted(record) => observer.on_delete(record),
            }));

            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(
                    key = %event.key(),
                    event = event.kind(),
                    subscription = handle.0,
                    "Observer failed: {:#}",
                    e
                ),
                Err(panic) => error!(
                    key = %event.key(),
                    event = event.kind(),
                    subscription = handle.0,
                    "Observer panicked: {}",
                    panic_message(panic.as_ref())
                ),
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
