// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! resourceVersion tokens and their ordering

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque resourceVersion as handed out by the API server.
///
/// The server emits decimal counters, so two well-formed tokens are ordered
/// numerically. Anything else (empty, missing, non-numeric) is malformed and
/// never compares as newer than another token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }

    pub fn is_malformed(&self) -> bool {
        self.numeric().is_none()
    }

    /// Strictly newer than `other`. False whenever either side is malformed.
    pub fn is_newer_than(&self, other: &VersionToken) -> bool {
        match (self.numeric(), other.numeric()) {
            (Some(ours), Some(theirs)) => ours > theirs,
            _ => false,
        }
    }

    /// The newer of two tokens, preferring `self` when they cannot be ordered
    /// unless `self` is malformed and `other` is not.
    pub fn newest(self, other: VersionToken) -> VersionToken {
        if other.is_newer_than(&self) || (self.is_malformed() && !other.is_malformed()) {
            other
        } else {
            self
        }
    }
}

impl From<&str> for VersionToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for VersionToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<Option<String>> for VersionToken {
    fn from(token: Option<String>) -> Self {
        Self(token.unwrap_or_default())
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
