// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use k8s_openapi::api::core::v1::Namespace;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use kinformer::cache::ObserverFns;
use kinformer::config::Config;
use kinformer::informer::Informer;
use kinformer::kubernetes::{create_client, KubeClusterClient, ListFilter};
use kinformer::logging;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    info!("Starting namespace informer");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: informer_duration={}s",
        config.informer_duration.as_secs()
    );

    let client = create_client(&config).await?;
    info!("Connected to Kubernetes cluster");

    let cluster = Arc::new(KubeClusterClient::<Namespace>::all(client));
    let cancel = CancellationToken::new();
    let (informer, handle) = Informer::<Namespace, _>::new(cluster, ListFilter::default(), cancel.clone());

    handle.subscribe(
        ObserverFns::new()
            .on_add(|ns| {
                info!("New namespace added: {}", ns.key);
                Ok(())
            })
            .on_update(|old, new| {
                info!("Namespace updated: {} ({} -> {})", new.key, old.version, new.version);
                Ok(())
            })
            .on_delete(|ns| {
                info!("Namespace deleted: {}", ns.key);
                Ok(())
            }),
    );

    let duration = config.informer_duration;
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("Interrupted, stopping informer"),
            _ = tokio::time::sleep(duration) => info!("Ran for {}s, stopping informer", duration.as_secs()),
        }
        cancel.cancel();
    });

    info!("Started informer");
    if let Err(e) = informer.run().await {
        warn!("Informer failed: {}", e);
        return Err(e.into());
    }

    info!(
        "Stopped informer with {} namespaces cached, exiting",
        handle.store().len()
    );
    Ok(())
}
