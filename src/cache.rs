// Copyright (c) 2025 - Cowboy AI, Inc.
//! TTL-bound resolution cache
//!
//! Maps an IP address string to the [`ResolvedDevice`] last fetched for it.
//! An entry is served only while it is younger than the TTL; an older entry is
//! dropped and re-resolved before anything is returned.
//!
//! # Locking
//!
//! ```text
//! slots: Mutex<HashMap<ip, Arc<Mutex<Option<ResolvedDevice>>>>>
//!        └─ held only to find/create a slot     └─ held across the refresh
//! ```
//!
//! Lookups of different addresses never wait on each other's network round
//! trips. Lookups of the same address are serialized, so a burst of records
//! carrying one address triggers a single resolution.
//!
//! The cache is bounded only by the number of distinct addresses seen.
//! [`ResolutionCache::purge_stale`] is the explicit sweep for long-running hosts.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::errors::NetBoxResult;
use crate::inventory::{DeviceResolver, ResolutionClient, ResolvedDevice};

type Slot = Arc<Mutex<Option<ResolvedDevice>>>;

/// Shared address → device cache in front of a [`DeviceResolver`]
pub struct ResolutionCache<R = ResolutionClient> {
    slots: Mutex<HashMap<String, Slot>>,
    ttl: Duration,
    resolver: R,
}

impl<R: DeviceResolver> ResolutionCache<R> {
    pub fn new(resolver: R, ttl: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            ttl,
            resolver,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Fresh cached resolution for `ip`, resolving it first when absent or stale
    pub async fn get(&self, ip: &str) -> NetBoxResult<ResolvedDevice> {
        let slot = self.slot(ip).await;
        let mut entry = slot.lock().await;

        if let Some(cached) = entry.as_ref() {
            if self.is_fresh(cached, Utc::now()) {
                debug!("Found valid cache entry for {}", ip);
                return Ok(cached.clone());
            }
            debug!(
                "Cache entry for {} resolved at {} is stale",
                ip, cached.resolved_at
            );
        }

        *entry = None;
        match self.resolver.resolve(ip).await {
            Ok(resolved) => {
                *entry = Some(resolved.clone());
                Ok(resolved)
            }
            Err(e) => {
                drop(entry);
                self.release_if_vacant(ip, slot).await;
                Err(e)
            }
        }
    }

    /// Store a resolution as if it had just been fetched at `resolved_at`
    pub async fn seed(&self, ip: impl Into<String>, resolved: ResolvedDevice) {
        let ip: String = ip.into();
        let slot = self.slot(&ip).await;
        *slot.lock().await = Some(resolved);
    }

    /// Cached resolution for `ip` regardless of age, without resolving
    pub async fn peek(&self, ip: &str) -> Option<ResolvedDevice> {
        let slot = self.slots.lock().await.get(ip).cloned()?;
        let entry = slot.lock().await;
        entry.clone()
    }

    /// Number of addresses holding a resolution
    pub async fn len(&self) -> usize {
        let mut count = 0;
        for slot in self.snapshot().await {
            if slot.lock().await.is_some() {
                count += 1;
            }
        }
        count
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every stale entry; returns how many were removed
    pub async fn purge_stale(&self) -> usize {
        let now = Utc::now();
        let mut purged = 0;
        for slot in self.snapshot().await {
            let mut entry = slot.lock().await;
            if entry.as_ref().is_some_and(|e| !self.is_fresh(e, now)) {
                *entry = None;
                purged += 1;
            }
        }

        let mut slots = self.slots.lock().await;
        slots.retain(|_, slot| !is_vacant(slot));
        if purged > 0 {
            debug!("Purged {} stale cache entries", purged);
        }
        purged
    }

    fn is_fresh(&self, entry: &ResolvedDevice, now: DateTime<Utc>) -> bool {
        match age(entry.resolved_at, now) {
            Some(age) => age < self.ttl,
            None => {
                warn!(
                    "Cache entry for {} is dated in the future ({})",
                    entry.device.name, entry.resolved_at
                );
                true
            }
        }
    }

    async fn slot(&self, ip: &str) -> Slot {
        let mut slots = self.slots.lock().await;
        slots.entry(ip.to_string()).or_default().clone()
    }

    async fn snapshot(&self) -> Vec<Slot> {
        self.slots.lock().await.values().cloned().collect()
    }

    // A failed first resolution must not leave an empty slot behind.
    async fn release_if_vacant(&self, ip: &str, slot: Slot) {
        drop(slot);
        let mut slots = self.slots.lock().await;
        if slots.get(ip).is_some_and(is_vacant) {
            slots.remove(ip);
        }
    }
}

/// Nobody but the map holds the slot and it carries no resolution.
/// Slot handles are only cloned under the map lock, so callers hold it too.
fn is_vacant(slot: &Slot) -> bool {
    Arc::strong_count(slot) == 1 && slot.try_lock().is_ok_and(|entry| entry.is_none())
}

fn age(resolved_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<Duration> {
    (now - resolved_at).to_std().ok()
}
