// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster client capability and its kube-rs backed implementation

use crate::cache::{EventKind, RawWatchEvent, ResourceKey, VersionToken};
use crate::config::Config;
use crate::error::{InformerError, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use kube::{
    api::{DeleteParams, ListParams, PostParams, WatchEvent, WatchParams},
    config::{KubeConfigOptions, Kubeconfig},
    core::NamespaceResourceScope,
    Api, Client, Config as KConfig, Resource,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use tracing::{debug, info, instrument};

/// Label and field selectors applied to both the listing and the watch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub label_selector: Option<String>,
    pub field_selector: Option<String>,
}

impl ListFilter {
    pub fn labels(mut self, selector: &str) -> Self {
        self.label_selector = Some(selector.to_string());
        self
    }

    pub fn fields(mut self, selector: &str) -> Self {
        self.field_selector = Some(selector.to_string());
        self
    }

    fn list_params(&self) -> ListParams {
        let mut lp = ListParams::default();
        if let Some(labels) = &self.label_selector {
            lp = lp.labels(labels);
        }
        if let Some(fields) = &self.field_selector {
            lp = lp.fields(fields);
        }
        lp
    }

    fn watch_params(&self) -> WatchParams {
        let mut wp = WatchParams::default();
        if let Some(labels) = &self.label_selector {
            wp = wp.labels(labels);
        }
        if let Some(fields) = &self.field_selector {
            wp = wp.fields(fields);
        }
        wp
    }
}

/// One item of a watch session
#[derive(Debug, Clone, PartialEq)]
pub enum WatchItem<K> {
    Event(RawWatchEvent<K>),
    /// The server has caught up to this version; nothing changed
    Bookmark(VersionToken),
}

pub type WatchStream<K> = BoxStream<'static, Result<WatchItem<K>>>;

/// Authenticated access to one resource collection of a cluster.
///
/// `watch` yields items until the session ends. An item of
/// [`InformerError::SessionExpired`] means `from` is too old to resume from
/// and the caller has to list again.
#[async_trait]
pub trait ClusterClient<K: Send + Sync + 'static>: Send + Sync {
    async fn list(&self, filter: &ListFilter) -> Result<(Vec<K>, VersionToken)>;

    async fn watch(&self, filter: &ListFilter, from: &VersionToken) -> Result<WatchStream<K>>;

    async fn create(&self, object: &K) -> Result<K>;

    async fn delete(&self, key: &ResourceKey) -> Result<()>;
}

/// [`ClusterClient`] over a typed `kube::Api`, scoped to the whole cluster or one namespace
pub struct KubeClusterClient<K> {
    api: Api<K>,
    namespace: Option<String>,
}

impl<K> KubeClusterClient<K>
where
    K: Resource<DynamicType = ()>,
{
    /// Cluster-wide access; create and delete only work for cluster-scoped kinds
    pub fn all(client: Client) -> Self {
        Self {
            api: Api::all(client),
            namespace: None,
        }
    }

    pub fn namespaced(client: Client, namespace: &str) -> Self
    where
        K: Resource<Scope = NamespaceResourceScope>,
    {
        Self {
            api: Api::namespaced(client, namespace),
            namespace: Some(namespace.to_string()),
        }
    }

    fn check_scope(&self, key: &ResourceKey) -> Result<()> {
        if key.namespace == self.namespace {
            return Ok(());
        }
        Err(InformerError::ScopeMismatch(format!(
            "{} is outside the client scope {}",
            key,
            self.namespace.as_deref().unwrap_or("<cluster>")
        )))
    }
}

fn expired_or_failed(code: u16, message: String) -> InformerError {
    if code == 410 {
        InformerError::SessionExpired(message)
    } else {
        InformerError::WatchFailed(format!("{} ({})", message, code))
    }
}

fn to_watch_item<K: Resource>(event: WatchEvent<K>) -> Result<WatchItem<K>> {
    match event {
        WatchEvent::Added(obj) => Ok(WatchItem::Event(RawWatchEvent::new(EventKind::Add, obj))),
        WatchEvent::Modified(obj) => Ok(WatchItem::Event(RawWatchEvent::new(EventKind::Update, obj))),
        WatchEvent::Deleted(obj) => Ok(WatchItem::Event(RawWatchEvent::new(EventKind::Delete, obj))),
        WatchEvent::Bookmark(bookmark) => Ok(WatchItem::Bookmark(bookmark.metadata.resource_version.into())),
        WatchEvent::Error(resp) => Err(expired_or_failed(resp.code, resp.message)),
    }
}

#[async_trait]
impl<K> ClusterClient<K> for KubeClusterClient<K>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Serialize + Debug + Send + Sync + 'static,
{
    #[instrument(skip(self))]
    async fn list(&self, filter: &ListFilter) -> Result<(Vec<K>, VersionToken)> {
        let list = self.api.list(&filter.list_params()).await?;
        let version = VersionToken::from(list.metadata.resource_version.clone());
        debug!("Listed {} objects at version {}", list.items.len(), version);
        Ok((list.items, version))
    }

    #[instrument(skip(self))]
    async fn watch(&self, filter: &ListFilter, from: &VersionToken) -> Result<WatchStream<K>> {
        let stream = match self.api.watch(&filter.watch_params(), from.as_str()).await {
            Ok(stream) => stream,
            Err(kube::Error::Api(resp)) => return Err(expired_or_failed(resp.code, resp.message)),
            Err(e) => return Err(e.into()),
        };

        Ok(stream
            .map(|item| item.map_err(InformerError::from).and_then(to_watch_item))
            .boxed())
    }

    #[instrument(skip(self, object))]
    async fn create(&self, object: &K) -> Result<K> {
        let key = ResourceKey::from_obj(object);
        self.check_scope(&key)?;

        info!("Creating {}", key);
        Ok(self.api.create(&PostParams::default(), object).await?)
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &ResourceKey) -> Result<()> {
        self.check_scope(key)?;

        info!("Deleting {}", key);
        self.api.delete(&key.name, &DeleteParams::default()).await?;
        Ok(())
    }
}

/// Create a client from an explicit kubeconfig file, or infer one from the environment
pub async fn create_client(config: &Config) -> Result<Client> {
    let Some(path) = &config.kubeconfig_path else {
        return Client::try_default()
            .await
            .map_err(|e| InformerError::KubeconfigError(format!("Failed to infer config: {}", e)));
    };

    info!("Loading kubeconfig from {}", path.display());

    let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
        InformerError::KubeconfigError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let client_config = KConfig::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| InformerError::KubeconfigError(format!("Failed to create config: {}", e)))?;

    Client::try_from(client_config)
        .map_err(|e| InformerError::KubeconfigError(format!("Failed to create client: {}", e)))
}
