// Copyright (c) 2025 - Cowboy AI, Inc.
//! NetBox tag enrichment for telemetry records
//!
//! Resolves IP-address tags into the device, site and region that own the
//! address in NetBox, caching resolutions for a configurable TTL, and rewrites
//! the record tags accordingly.
//!
//! # Example
//!
//! ```rust,no_run
//! use cim_netbox_enrichment::{EnrichmentConfig, Record, TagTransformer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EnrichmentConfig {
//!         netbox_addr: "netbox.example.net".to_string(),
//!         netbox_token: "your-token-here".to_string(),
//!         preserve_original: true,
//!         ..Default::default()
//!     };
//!     let transformer = TagTransformer::from_config(&config)?;
//!
//!     let record = Record::new("lsp_stats").with_tag("source-address", "141.193.3.5");
//!     let enriched = transformer.apply(vec![record]).await;
//!     println!("{:?}", enriched[0].tag("source-device"));
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod errors;
pub mod inventory;
pub mod record;
pub mod transform;

// Re-export commonly used types
pub use cache::ResolutionCache;
pub use config::{EnrichmentConfig, TlsPolicy, DEFAULT_ENTRY_TTL};
pub use errors::{NetBoxError, NetBoxResult};
pub use inventory::{
    DeviceResolver, ElementKind, HttpInventoryTransport, InventoryElement, InventoryTransport,
    ResolutionClient, ResolvedDevice,
};
pub use record::Record;
pub use transform::{
    ApplyStats, TagTransformer, Transform, TransformOptions, TransformRegistry, IP_TO_DEVICE,
};
