// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod informer;
pub mod kubernetes;
pub mod logging;

#[cfg(test)]
pub mod test_utils;
