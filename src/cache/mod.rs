// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Watch cache: a local mirror of a resource collection and its observers.

pub mod key;
pub mod observer;
pub mod record;
pub mod store;
pub mod version;
pub mod watch_cache;

pub use key::ResourceKey;
pub use observer::{Observer, ObserverFns, ObserverRegistry, SubscriptionHandle};
pub use record::{ChangeEvent, EventKind, RawWatchEvent, ResourceRecord};
pub use store::Store;
pub use version::VersionToken;
pub use watch_cache::WatchCache;
