// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Identity of a watched object within a collection

use crate::error::{InformerError, Result};
use kube::{Resource, ResourceExt};
use std::fmt;
use std::str::FromStr;

/// `(namespace, name)` for namespaced objects, `name` alone for cluster-scoped ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub namespace: Option<String>,
    pub name: String,
}

impl ResourceKey {
    pub fn cluster(name: &str) -> Self {
        Self {
            namespace: None,
            name: name.to_string(),
        }
    }

    pub fn namespaced(namespace: &str, name: &str) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            name: name.to_string(),
        }
    }

    /// Build the key of a Kubernetes object from its metadata
    pub fn from_obj<K: Resource>(obj: &K) -> Self {
        Self {
            namespace: obj.namespace(),
            name: obj.name_any(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for ResourceKey {
    type Err = InformerError;

    fn from_str(s: &str) -> Result<Self> {
        let key = match s.split_once('/') {
            Some((ns, name)) => ResourceKey::namespaced(ns, name),
            None => ResourceKey::cluster(s),
        };

        let valid = !key.name.is_empty()
            && !key.name.contains('/')
            && key.namespace.as_deref().map_or(true, |ns| !ns.is_empty());
        if !valid {
            return Err(InformerError::InvalidKey(s.to_string()));
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{ConfigMap, Namespace};
    use kube::api::ObjectMeta;

    #[test]
    fn test_display_namespaced() {
        assert_eq!(ResourceKey::namespaced("ns", "a").to_string(), "ns/a");
    }

    #[test]
    fn test_display_cluster_scoped() {
        assert_eq!(ResourceKey::cluster("kube-system").to_string(), "kube-system");
    }

    #[test]
    fn test_parse_namespaced() {
        let key: ResourceKey = "ns/a".parse().unwrap();
        assert_eq!(key, ResourceKey::namespaced("ns", "a"));
    }

    #[test]
    fn test_parse_cluster_scoped() {
        let key: ResourceKey = "default".parse().unwrap();
        assert_eq!(key, ResourceKey::cluster("default"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("".parse::<ResourceKey>().is_err());
        assert!("/a".parse::<ResourceKey>().is_err());
        assert!("ns/".parse::<ResourceKey>().is_err());
        assert!("ns/a/b".parse::<ResourceKey>().is_err());
    }

    #[test]
    fn test_from_namespaced_obj() {
        let cm = ConfigMap {
            metadata: ObjectMeta {
                name: Some("settings".to_string()),
                namespace: Some("apps".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(ResourceKey::from_obj(&cm), ResourceKey::namespaced("apps", "settings"));
    }

    #[test]
    fn test_from_cluster_scoped_obj() {
        let ns = Namespace {
            metadata: ObjectMeta {
                name: Some("apps".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(ResourceKey::from_obj(&ns), ResourceKey::cluster("apps"));
    }
}
