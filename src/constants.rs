// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Defaults for the demo programs, overridable through the environment
pub mod defaults {
    /// Namespace the CRUD walkthrough creates and removes again
    pub const DEMO_NAMESPACE: &str = "new-test-namespace";
    /// Label selector used to find pods across all namespaces
    pub const POD_LABEL_SELECTOR: &str = "k8s-app=kube-dns";
    /// How long the informer demo runs before it is cancelled
    pub const INFORMER_DURATION_SECS: u64 = 300;
}

/// The hello-world pod created by the CRUD walkthrough
pub mod hello_pod {
    pub const NAME: &str = "hello-world";
    pub const CONTAINER: &str = "hello-world";
    pub const IMAGE: &str = "alpine:latest";
    pub const COMMAND: [&str; 3] = ["bash", "-c", "while true; do echo hello world!; sleep 1; done"];
}
