// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The ingestion lane: list, watch, resync, stop.

use crate::cache::{Observer, ObserverRegistry, ResourceRecord, Store, SubscriptionHandle, WatchCache};
use crate::error::Result;
use crate::informer::WatchSession;
use crate::kubernetes::{ClusterClient, ListFilter, WatchItem};
use futures::StreamExt;
use kube::Resource;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// How a single watch session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// The server closed the stream; resume from the last version
    Closed,
    Cancelled,
}

/// Keeps a [`WatchCache`] in sync with one resource collection.
///
/// `run` is the only writer to the cache. Everything else goes through the
/// [`InformerHandle`] returned by [`Informer::new`].
pub struct Informer<K, C> {
    client: Arc<C>,
    filter: ListFilter,
    cache: WatchCache<K>,
    cancel: CancellationToken,
    synced: Arc<AtomicBool>,
    session_tx: watch::Sender<WatchSession>,
}

/// Read access, subscriptions and lifecycle control for a running [`Informer`]
pub struct InformerHandle<K> {
    store: Store<K>,
    observers: ObserverRegistry<K>,
    cancel: CancellationToken,
    synced: Arc<AtomicBool>,
    session_rx: watch::Receiver<WatchSession>,
}

impl<K> Clone for InformerHandle<K> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            observers: self.observers.clone(),
            cancel: self.cancel.clone(),
            synced: self.synced.clone(),
            session_rx: self.session_rx.clone(),
        }
    }
}

impl<K> InformerHandle<K> {
    pub fn store(&self) -> Store<K> {
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

    /// Whether the initial listing has been loaded into the store
    pub fn has_synced(&self) -> bool {
        self.synced.load(Ordering::SeqCst)
    }

    pub fn session(&self) -> WatchSession {
        self.session_rx.borrow().clone()
    }

    /// Receiver that is notified on every session state change
    pub fn session_updates(&self) -> watch::Receiver<WatchSession> {
        self.session_rx.clone()
    }

    /// Ask the informer to stop at the next event boundary
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

/// Resolve `fut` unless `cancel` fires first
async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        output = fut => Some(output),
    }
}

impl<K, C> Informer<K, C>
where
    K: Resource + Clone + Send + Sync + 'static,
    C: ClusterClient<K>,
{
    pub fn new(client: Arc<C>, filter: ListFilter, cancel: CancellationToken) -> (Self, InformerHandle<K>) {
        let cache = WatchCache::new();
        let synced = Arc::new(AtomicBool::new(false));
        let (session_tx, session_rx) = watch::channel(WatchSession::default());

        let handle = InformerHandle {
            store: cache.reader(),
            observers: cache.registry(),
            cancel: cancel.clone(),
            synced: synced.clone(),
            session_rx,
        };

        let informer = Self {
            client,
            filter,
            cache,
            cancel,
            synced,
            session_tx,
        };
        (informer, handle)
    }

    /// List, then watch until cancelled.
    ///
    /// Sessions that end normally are resumed from the last seen version; a
    /// session that can no longer resume triggers a full re-list and resync.
    /// Any other failure ends the run. Cancelling leaves the cache as is and
    /// notifies nobody.
    #[instrument(skip(self), fields(filter = ?self.filter))]
    pub async fn run(mut self) -> Result<()> {
        info!("Informer started, performing initial list...");

        let Some(listing) = until_cancelled(&self.cancel, self.client.list(&self.filter)).await else {
            info!("Informer cancelled before initial list completed");
            return Ok(());
        };
        let (items, version) = listing?;
        self.cache.start(items.into_iter().map(ResourceRecord::from_obj), version)?;
        self.synced.store(true, Ordering::SeqCst);
        info!(
            "Initial list complete with {} objects, watching from version {}",
            self.cache.reader().len(),
            self.cache.last_version()
        );

        let mut epoch = 0;
        let outcome = loop {
            epoch += 1;
            match self.watch_session(epoch).await {
                Ok(SessionEnd::Cancelled) => break Ok(()),
                Ok(SessionEnd::Closed) => {
                    debug!("Watch session {} closed, resuming", epoch);
                }
                Err(e) if e.is_expired() => {
                    warn!("Watch session {} expired ({}), re-listing", epoch, e);
                    match self.relist().await {
                        Ok(true) => {}
                        Ok(false) => break Ok(()),
                        Err(e) => break Err(e),
                    }
                }
                Err(e) => break Err(e),
            }
        };

        self.session_tx.send_modify(WatchSession::disconnect);
        match &outcome {
            Ok(()) => info!("Informer stopped"),
            Err(e) => warn!("Informer stopped on error: {}", e),
        }
        outcome
    }

    async fn watch_session(&mut self, epoch: u64) -> Result<SessionEnd> {
        let from = self.cache.last_version();
        let mut session = WatchSession::connect(epoch, from.clone());
        self.session_tx.send_replace(session.clone());
        debug!("Watch session {} connecting from version {}", epoch, from);

        let Some(stream) = until_cancelled(&self.cancel, self.client.watch(&self.filter, &from)).await else {
            return Ok(SessionEnd::Cancelled);
        };
        let mut stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                session.disconnect();
                self.session_tx.send_replace(session);
                return Err(e);
            }
        };

        session.streaming();
        self.session_tx.send_replace(session.clone());

        loop {
            let Some(next) = until_cancelled(&self.cancel, stream.next()).await else {
                return Ok(SessionEnd::Cancelled);
            };

            match next {
                Some(Ok(WatchItem::Event(raw))) => self.cache.apply_event(raw)?,
                Some(Ok(WatchItem::Bookmark(version))) => self.cache.bookmark(version)?,
                Some(Err(e)) => {
                    session.disconnect();
                    self.session_tx.send_replace(session);
                    return Err(e);
                }
                None => {
                    session.disconnect();
                    self.session_tx.send_replace(session);
                    return Ok(SessionEnd::Closed);
                }
            }
        }
    }

    /// Returns false when cancelled before the listing arrived
    async fn relist(&mut self) -> Result<bool> {
        let Some(listing) = until_cancelled(&self.cancel, self.client.list(&self.filter)).await else {
            return Ok(false);
        };
        let (items, version) = listing?;
        self.cache.resync(items.into_iter().map(ResourceRecord::from_obj), version)?;
        Ok(true)
    }
}
