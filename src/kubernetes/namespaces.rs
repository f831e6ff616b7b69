// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace management utilities

use crate::cache::ResourceKey;
use crate::error::{InformerError, Result};
use crate::kubernetes::{ClusterClient, ListFilter};
use k8s_openapi::api::core::v1::Namespace;
use kube::api::ObjectMeta;
use tracing::{debug, info, instrument};

/// List all namespaces in the cluster
#[instrument(skip(cluster))]
pub async fn list_namespaces(cluster: &impl ClusterClient<Namespace>) -> Result<Vec<Namespace>> {
    let (namespaces, version) = cluster.list(&ListFilter::default()).await?;
    debug!("Fetched {} namespaces at version {}", namespaces.len(), version);
    Ok(namespaces)
}

/// Create a namespace
#[instrument(skip(cluster))]
pub async fn create_namespace(cluster: &impl ClusterClient<Namespace>, name: &str) -> Result<Namespace> {
    let ns = Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    let created = cluster.create(&ns).await.map_err(|e| {
        InformerError::NamespaceError(format!("Failed to create namespace {}: {}", name, e))
    })?;
    info!("Namespace {} created successfully", name);
    Ok(created)
}

/// Delete a namespace and everything in it
#[instrument(skip(cluster))]
pub async fn delete_namespace(cluster: &impl ClusterClient<Namespace>, name: &str) -> Result<()> {
    cluster
        .delete(&ResourceKey::cluster(name))
        .await
        .map_err(|e| InformerError::NamespaceError(format!("Failed to delete namespace {}: {}", name, e)))?;
    info!("Namespace {} deleted", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::KubeClusterClient;
    use crate::test_utils::{namespace_json, FakeClusterClient, MockService};
    use kube::ResourceExt;

    fn namespace(name: &str) -> Namespace {
        Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_list_namespaces() {
        let cluster = FakeClusterClient::new(vec![namespace("default"), namespace("kube-system")]);

        let names: Vec<_> = list_namespaces(&cluster)
            .await
            .unwrap()
            .iter()
            .map(|ns| ns.name_any())
            .collect();

        assert_eq!(names, vec!["default", "kube-system"]);
    }

    #[tokio::test]
    async fn test_create_then_delete_namespace() {
        let cluster = FakeClusterClient::new(vec![]);

        let created = create_namespace(&cluster, "new-test-namespace").await.unwrap();
        assert_eq!(created.name_any(), "new-test-namespace");
        assert!(created.resource_version().is_some());
        assert!(cluster.contains(&ResourceKey::cluster("new-test-namespace")));

        delete_namespace(&cluster, "new-test-namespace").await.unwrap();
        assert!(!cluster.contains(&ResourceKey::cluster("new-test-namespace")));
    }

    #[tokio::test]
    async fn test_delete_missing_namespace_fails() {
        let cluster: FakeClusterClient<Namespace> = FakeClusterClient::new(vec![]);

        let err = delete_namespace(&cluster, "ghost").await.unwrap_err();

        assert!(matches!(err, InformerError::NamespaceError(_)));
    }

    #[tokio::test]
    async fn test_create_namespace_against_api() {
        let client = MockService::new()
            .on_post("/api/v1/namespaces", 201, &namespace_json("test-ns"))
            .into_client();
        let cluster = KubeClusterClient::all(client);

        let created = create_namespace(&cluster, "test-ns").await.unwrap();

        assert_eq!(created.name_any(), "test-ns");
    }

    #[tokio::test]
    async fn test_create_namespace_api_failure() {
        let client = MockService::new().into_client();
        let cluster = KubeClusterClient::all(client);

        let result = create_namespace(&cluster, "test-ns").await;

        assert!(matches!(result, Err(InformerError::NamespaceError(_))));
    }
}
