// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide event counter (home page visits, predictions served)
///
/// Not persisted; starts from zero on every process start.
#[derive(Debug, Default)]
pub struct Counter {
    count: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one event and return the new total
    pub fn increment_and_get(&self) -> u64 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Current total, without recording an event
    pub fn current(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}
