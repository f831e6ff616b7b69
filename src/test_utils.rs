// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a canned Kubernetes API and an in-memory cluster client.

use crate::cache::{ResourceKey, VersionToken};
use crate::error::{InformerError, Result};
use crate::kubernetes::{ClusterClient, ListFilter, WatchItem, WatchStream};
use async_trait::async_trait;
use futures::StreamExt;
use http::{Request, Response};
use kube::client::Body;
use kube::{Client, Resource, ResourceExt};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for GET requests with `watch=true` on the path
    pub fn on_watch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("WATCH", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    /// Add a response for DELETE requests matching the path
    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        // Try exact match first
        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Try prefix match for paths like /api/v1/namespaces/foo
        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let is_watch = req
            .uri()
            .query()
            .is_some_and(|q| q.split('&').any(|kv| kv == "watch=true"));
        let method = if is_watch {
            "WATCH".to_string()
        } else {
            req.method().to_string()
        };
        let path = req.uri().path().to_string();

        let response = self.find_response(&method, &path);

        Box::pin(async move {
            let (status, body) = response.unwrap_or_else(|| (404, not_found_json("resource", &path)));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock namespace JSON response
pub fn namespace_json(name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": "test-uid"
        }
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Line-delimited watch response body
pub fn watch_body(events: &[serde_json::Value]) -> String {
    events.iter().map(|e| format!("{}\n", e)).collect()
}

/// In-memory [`ClusterClient`] with scripted watch sessions.
///
/// Every create bumps a cluster-wide version counter. Listings and watch
/// sessions can be scripted; scripted items are consumed in order. Once the
/// scripted sessions run out, watches stay open and idle.
pub struct FakeClusterClient<K> {
    objects: Mutex<BTreeMap<ResourceKey, K>>,
    version: AtomicU64,
    sessions: Mutex<VecDeque<Vec<Result<WatchItem<K>>>>>,
    listings: Mutex<VecDeque<(Vec<K>, u64)>>,
    watched_from: Mutex<Vec<VersionToken>>,
    lists: AtomicUsize,
}

impl<K: Resource + Clone> FakeClusterClient<K> {
    pub fn new(initial: Vec<K>) -> Self {
        let client = Self {
            objects: Mutex::new(BTreeMap::new()),
            version: AtomicU64::new(0),
            sessions: Mutex::new(VecDeque::new()),
            listings: Mutex::new(VecDeque::new()),
            watched_from: Mutex::new(Vec::new()),
            lists: AtomicUsize::new(0),
        };
        for obj in initial {
            client.store(obj);
        }
        client
    }

    fn store(&self, mut obj: K) -> K {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        obj.meta_mut().resource_version = Some(version.to_string());
        self.objects
            .lock()
            .unwrap()
            .insert(ResourceKey::from_obj(&obj), obj.clone());
        obj
    }

    /// Queue a cluster state that replaces the contents at the start of the next listing
    pub fn push_listing(&self, objects: Vec<K>, version: u64) {
        self.listings.lock().unwrap().push_back((objects, version));
    }

    pub fn push_session(&self, items: Vec<Result<WatchItem<K>>>) {
        self.sessions.lock().unwrap().push_back(items);
    }

    pub fn watched_from(&self) -> Vec<VersionToken> {
        self.watched_from.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }
}

fn matches_labels<K: Resource>(obj: &K, selector: Option<&str>) -> bool {
    let Some(selector) = selector else {
        return true;
    };
    let labels = obj.labels();
    selector
        .split(',')
        .filter_map(|term| term.split_once('='))
        .all(|(k, v)| labels.get(k.trim()).is_some_and(|actual| actual == v.trim()))
}

pub fn not_found(key: &ResourceKey) -> InformerError {
    let resp = serde_json::from_str(&not_found_json("object", &key.to_string())).unwrap();
    InformerError::KubeError(kube::Error::Api(resp))
}

#[async_trait]
impl<K> ClusterClient<K> for FakeClusterClient<K>
where
    K: Resource + Clone + Send + Sync + 'static,
{
    async fn list(&self, filter: &ListFilter) -> Result<(Vec<K>, VersionToken)> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        let next = self.listings.lock().unwrap().pop_front();
        if let Some((objects, version)) = next {
            let mut stored = self.objects.lock().unwrap();
            stored.clear();
            for obj in objects {
                stored.insert(ResourceKey::from_obj(&obj), obj);
            }
            self.version.store(version, Ordering::SeqCst);
        }
        let items = self
            .objects
            .lock()
            .unwrap()
            .values()
            .filter(|obj| matches_labels(*obj, filter.label_selector.as_deref()))
            .cloned()
            .collect();
        let version = self.version.load(Ordering::SeqCst).to_string();
        Ok((items, version.into()))
    }

    async fn watch(&self, _filter: &ListFilter, from: &VersionToken) -> Result<WatchStream<K>> {
        self.watched_from.lock().unwrap().push(from.clone());
        match self.sessions.lock().unwrap().pop_front() {
            Some(items) => Ok(futures::stream::iter(items).boxed()),
            None => Ok(futures::stream::pending::<Result<WatchItem<K>>>().boxed()),
        }
    }

    async fn create(&self, object: &K) -> Result<K> {
        Ok(self.store(object.clone()))
    }

    async fn delete(&self, key: &ResourceKey) -> Result<()> {
        match self.objects.lock().unwrap().remove(key) {
            Some(_) => Ok(()),
            None => Err(not_found(key)),
        }
    }
}
