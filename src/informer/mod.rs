// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

pub mod runner;
pub mod session;

pub use runner::{Informer, InformerHandle};
pub use session::{SessionState, WatchSession};
