// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Watch session bookkeeping

use crate::cache::VersionToken;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Streaming,
    Disconnected,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Connecting => "connecting",
            SessionState::Streaming => "streaming",
            SessionState::Disconnected => "disconnected",
        })
    }
}

/// One connection epoch to the watch stream.
///
/// Epoch 0 is the placeholder before the first connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSession {
    pub epoch: u64,
    pub start_version: VersionToken,
    pub state: SessionState,
}

impl WatchSession {
    pub fn connect(epoch: u64, start_version: VersionToken) -> Self {
        Self {
            epoch,
            start_version,
            state: SessionState::Connecting,
        }
    }

    pub fn streaming(&mut self) {
        self.state = SessionState::Streaming;
    }

    pub fn disconnect(&mut self) {
        self.state = SessionState::Disconnected;
    }
}

impl Default for WatchSession {
    fn default() -> Self {
        Self {
            epoch: 0,
            start_version: VersionToken::default(),
            state: SessionState::Disconnected,
        }
    }
}
