// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::ResourceExt;
use tracing::info;

use kinformer::cache::ResourceKey;
use kinformer::config::Config;
use kinformer::kubernetes::{
    create_client, create_namespace, create_pod, delete_namespace, delete_pod, hello_world_pod, list_namespaces,
    list_pods, KubeClusterClient,
};
use kinformer::logging;

/// Walk through namespace and pod CRUD against the current cluster
#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = Config::from_env()?;
    let client = create_client(&config).await?;
    let namespaces = KubeClusterClient::<Namespace>::all(client.clone());

    info!("This cluster has the following namespaces");
    for ns in list_namespaces(&namespaces).await? {
        info!("{}", ns.name_any());
    }

    let namespace = create_namespace(&namespaces, &config.demo_namespace).await?;
    let namespace_name = namespace.name_any();

    let pods_in_namespace = KubeClusterClient::<Pod>::namespaced(client.clone(), &namespace_name);
    let pod = create_pod(&pods_in_namespace, &hello_world_pod(&namespace_name)).await?;

    let all_pods = KubeClusterClient::<Pod>::all(client);
    info!(
        "This cluster has the following pods that match labelSelector: {}",
        config.pod_label_selector
    );
    for pod in list_pods(&all_pods, &config.pod_label_selector).await? {
        info!(
            "Namespace: {} Pod: {}",
            pod.namespace().unwrap_or_default(),
            pod.name_any()
        );
    }

    delete_pod(&pods_in_namespace, &ResourceKey::from_obj(&pod)).await?;
    delete_namespace(&namespaces, &namespace_name).await?;

    info!("Done");
    Ok(())
}
