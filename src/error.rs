// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InformerError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to load kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Watch cache already started")]
    AlreadyStarted,

    #[error("Watch cache not started")]
    NotStarted,

    #[error("Watch session expired: {0}")]
    SessionExpired(String),

    #[error("Watch failed: {0}")]
    WatchFailed(String),

    #[error("Invalid resource key: {0}")]
    InvalidKey(String),

    #[error("Resource scope mismatch: {0}")]
    ScopeMismatch(String),

    #[error("Namespace operation failed: {0}")]
    NamespaceError(String),

    #[error("Pod operation failed: {0}")]
    PodError(String),
}

impl InformerError {
    /// Whether the error means the watch cannot resume and a re-list is required
    pub fn is_expired(&self) -> bool {
        match self {
            InformerError::SessionExpired(_) => true,
            InformerError::KubeError(kube::Error::Api(resp)) => resp.code == 410,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, InformerError>;
