// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request-scoped report storage
//!
//! Every prediction gets its own `ReportId`. Reports live in memory, bounded
//! by an LRU capacity and a TTL; expired entries are dropped lazily when
//! touched or by `purge_expired`. The most recent report is tracked separately
//! for the legacy `/download_report` route.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use chrono::NaiveDateTime;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use crate::decision::Decision;

/// Identifier handed back to the client for a single report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(Uuid);

impl ReportId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ReportId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A rendered report and the decision it describes
#[derive(Debug, Clone)]
pub struct StoredReport {
    pub id: ReportId,
    pub decision: Decision,
    pub generated_at: NaiveDateTime,
    pub pdf: Bytes,
    stored_at: Instant,
}

#[derive(Debug, Clone)]
pub struct ReportStoreConfig {
    /// Maximum number of reports kept in memory
    pub capacity: NonZeroUsize,
    /// How long a report stays downloadable
    pub ttl: Duration,
}

impl Default for ReportStoreConfig {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(128).unwrap_or(NonZeroUsize::MIN),
            ttl: Duration::from_secs(3600),
        }
    }
}

struct Inner {
    reports: LruCache<ReportId, StoredReport>,
    latest: Option<ReportId>,
}

pub struct ReportStore {
    ttl: Duration,
    inner: Mutex<Inner>,
}

impl ReportStore {
    pub fn new(config: ReportStoreConfig) -> Self {
        Self {
            ttl: config.ttl,
            inner: Mutex::new(Inner {
                reports: LruCache::new(config.capacity),
                latest: None,
            }),
        }
    }

    /// Store a rendered report under a fresh id
    pub async fn insert(
        &self,
        decision: Decision,
        generated_at: NaiveDateTime,
        pdf: impl Into<Bytes>,
    ) -> ReportId {
        let id = ReportId::new();
        let report = StoredReport {
            id,
            decision,
            generated_at,
            pdf: pdf.into(),
            stored_at: Instant::now(),
        };

        let mut inner = self.inner.lock().await;
        if let Some((evicted, _)) = inner.reports.push(id, report) {
            debug!(report_id = %evicted, "Evicted least recently used report");
        }
        inner.latest = Some(id);
        id
    }

    /// Fetch a report by id, dropping it if it has expired
    pub async fn get(&self, id: &ReportId) -> Option<StoredReport> {
        let mut inner = self.inner.lock().await;
        self.get_live(&mut inner, id)
    }

    /// The most recently stored report, if it is still live
    pub async fn latest(&self) -> Option<StoredReport> {
        let mut inner = self.inner.lock().await;
        let id = inner.latest?;
        self.get_live(&mut inner, &id)
    }

    /// Drop every expired report; returns how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let expired: Vec<ReportId> = inner
            .reports
            .iter()
            .filter(|(_, report)| report.stored_at.elapsed() >= self.ttl)
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            inner.reports.pop(id);
        }
        expired.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.reports.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Periodically drop expired reports until the store is dropped
    pub fn spawn_purge_task(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(store) = weak.upgrade() else {
                    break;
                };
                let removed = store.purge_expired().await;
                if removed > 0 {
                    debug!(removed, "Purged expired reports");
                }
            }
        })
    }

    fn get_live(&self, inner: &mut Inner, id: &ReportId) -> Option<StoredReport> {
        let expired = match inner.reports.get(id) {
            Some(report) if report.stored_at.elapsed() < self.ttl => return Some(report.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            inner.reports.pop(id);
            debug!(report_id = %id, "Report expired");
        }
        None
    }
}
