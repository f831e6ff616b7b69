// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::defaults;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Demo configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Explicit kubeconfig file; when unset the client config is inferred
    pub kubeconfig_path: Option<PathBuf>,
    /// How long the informer runs before it is cancelled
    pub informer_duration: Duration,
    pub demo_namespace: String,
    pub pod_label_selector: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let kubeconfig_path = lookup("KUBECONFIG_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let informer_duration = match lookup("INFORMER_DURATION_SECS") {
            Some(secs) => secs
                .trim()
                .parse::<u64>()
                .with_context(|| format!("INFORMER_DURATION_SECS is not a number of seconds: {}", secs))?,
            None => defaults::INFORMER_DURATION_SECS,
        };

        let demo_namespace = lookup("DEMO_NAMESPACE").unwrap_or_else(|| defaults::DEMO_NAMESPACE.to_string());
        let pod_label_selector =
            lookup("POD_LABEL_SELECTOR").unwrap_or_else(|| defaults::POD_LABEL_SELECTOR.to_string());

        Ok(Config {
            kubeconfig_path,
            informer_duration: Duration::from_secs(informer_duration),
            demo_namespace,
            pod_label_selector,
        })
    }
}
