// Copyright (c) 2025 - Cowboy AI, Inc.
//! NetBox inventory resolution
//!
//! Turns a single IP address into the device that owns it, the site the device
//! is racked in and the region the site belongs to:
//!
//! ```text
//! GET /ipam/ip-addresses/?q=<ip>/32 ──> device ─┐
//!                                                │ device.url
//! GET <device detail>               ──> site   ─┤
//!                                                │ site.url
//! GET <site detail>                 ──> region ─┘
//! ```
//!
//! Each hop depends on the URL returned by the previous one, so the chain is
//! strictly sequential and all-or-nothing.

pub mod client;
pub mod element;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::NetBoxResult;

pub use client::{HttpInventoryTransport, InventoryTransport, ResolutionClient};
pub use element::{ElementKind, InventoryElement};

/// Fully resolved topology of one address at the moment it was fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDevice {
    pub device: InventoryElement,
    pub site: InventoryElement,
    pub region: InventoryElement,
    pub resolved_at: DateTime<Utc>,
}

/// Anything that can resolve an address into its device, site and region
#[async_trait]
pub trait DeviceResolver: Send + Sync {
    /// Resolve `ip` through the full chain, or fail without a partial result
    async fn resolve(&self, ip: &str) -> NetBoxResult<ResolvedDevice>;
}
