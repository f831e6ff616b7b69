// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster access: the client capability plus the namespace and pod operations of the demos.

pub mod client;
pub mod namespaces;
pub mod pods;

pub use client::{create_client, ClusterClient, KubeClusterClient, ListFilter, WatchItem, WatchStream};
pub use namespaces::{create_namespace, delete_namespace, list_namespaces};
pub use pods::{create_pod, delete_pod, hello_world_pod, list_pods};
