// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod creation, lookup by label and deletion

use crate::cache::ResourceKey;
use crate::constants::hello_pod;
use crate::error::{InformerError, Result};
use crate::kubernetes::{ClusterClient, ListFilter};
use k8s_openapi::api::core::v1::{Container, Pod, PodSpec};
use kube::{api::ObjectMeta, ResourceExt};
use tracing::{info, instrument};

/// A pod running a single container that prints "hello world!" every second
pub fn hello_world_pod(namespace: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(hello_pod::NAME.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: hello_pod::CONTAINER.to_string(),
                image: Some(hello_pod::IMAGE.to_string()),
                command: Some(hello_pod::COMMAND.iter().map(|s| s.to_string()).collect()),
                ..Default::default()
            }],
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[instrument(skip(cluster, pod), fields(pod = %ResourceKey::from_obj(pod)))]
pub async fn create_pod(cluster: &impl ClusterClient<Pod>, pod: &Pod) -> Result<Pod> {
    let created = cluster.create(pod).await.map_err(|e| {
        InformerError::PodError(format!("Failed to create pod {}: {}", ResourceKey::from_obj(pod), e))
    })?;
    info!(
        "Pod {}/{} created",
        created.namespace().unwrap_or_default(),
        created.name_any()
    );
    Ok(created)
}

/// List the pods matching `label_selector` in the client's scope
#[instrument(skip(cluster))]
pub async fn list_pods(cluster: &impl ClusterClient<Pod>, label_selector: &str) -> Result<Vec<Pod>> {
    let (pods, _) = cluster.list(&ListFilter::default().labels(label_selector)).await?;
    Ok(pods)
}

#[instrument(skip(cluster))]
pub async fn delete_pod(cluster: &impl ClusterClient<Pod>, key: &ResourceKey) -> Result<()> {
    cluster
        .delete(key)
        .await
        .map_err(|e| InformerError::PodError(format!("Failed to delete pod {}: {}", key, e)))?;
    info!("Pod {} deleted", key);
    Ok(())
}
