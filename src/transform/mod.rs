// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tag transform engine
//!
//! Rewrites record tags from NetBox data:
//!
//! ```text
//! source-address=141.193.3.5
//!     │ ip-to-device
//!     ▼
//! source-device=br1-sjc1  source-site=sjc1  source-region=US_WEST
//! ```
//!
//! The output tag names keep the direction of the input tag: keys starting with
//! `source` produce `source-*` tags, keys starting with `destination` produce
//! `destination-*` tags, anything else produces bare `device`/`site`/`region`.
//!
//! Resolution failures never abort a batch. The affected tag simply gets no
//! derived tags; whether the original tag survives is governed by
//! [`TransformOptions`].

pub mod registry;

use tracing::{debug, debug_span, warn, Instrument};
use uuid::Uuid;

use crate::cache::ResolutionCache;
use crate::config::EnrichmentConfig;
use crate::errors::NetBoxResult;
use crate::inventory::{DeviceResolver, ResolutionClient, ResolvedDevice};
use crate::record::Record;

pub use registry::{Transform, TransformRegistry, IP_TO_DEVICE};

/// Tag-removal behaviour of the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformOptions {
    /// Keep the original tag after transforming it
    pub preserve_original: bool,
    /// Keep the original tag when its resolution failed
    pub keep_original_on_failure: bool,
}

impl TransformOptions {
    fn removes_original(&self, resolved: bool) -> bool {
        !self.preserve_original && (resolved || !self.keep_original_on_failure)
    }
}

impl From<&EnrichmentConfig> for TransformOptions {
    fn from(config: &EnrichmentConfig) -> Self {
        Self {
            preserve_original: config.preserve_original,
            keep_original_on_failure: config.keep_original_on_failure,
        }
    }
}

/// Counters for one `apply` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    /// Tags successfully resolved into derived tags
    pub resolved: usize,
    /// Tags whose resolution failed
    pub failed: usize,
    /// Tags with no configured transform
    pub skipped: usize,
}

impl ApplyStats {
    fn merge(&mut self, other: ApplyStats) {
        self.resolved += other.resolved;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

/// Output tag prefix derived from the direction encoded in `tag_key`
pub fn tag_prefix(tag_key: &str) -> &'static str {
    if tag_key.starts_with("source") {
        "source-"
    } else if tag_key.starts_with("destination") {
        "destination-"
    } else {
        ""
    }
}

/// Device, site and region tags for a resolution of `tag_key`'s value
pub fn derived_tags(tag_key: &str, resolved: &ResolvedDevice) -> [(String, String); 3] {
    let prefix = tag_prefix(tag_key);
    [
        (format!("{}device", prefix), resolved.device.name.clone()),
        (format!("{}site", prefix), resolved.site.name.clone()),
        (format!("{}region", prefix), resolved.region.name.clone()),
    ]
}

/// Applies configured transforms to batches of records
pub struct TagTransformer<R = ResolutionClient> {
    registry: TransformRegistry,
    cache: ResolutionCache<R>,
    options: TransformOptions,
}

impl TagTransformer<ResolutionClient> {
    /// Wire registry, cache and NetBox client from configuration
    pub fn from_config(config: &EnrichmentConfig) -> NetBoxResult<Self> {
        let client = ResolutionClient::from_config(config)?;
        let cache = ResolutionCache::new(client, config.entry_ttl());
        Ok(Self::new(
            TransformRegistry::from_config(&config.transforms),
            cache,
            TransformOptions::from(config),
        ))
    }
}

impl<R: DeviceResolver> TagTransformer<R> {
    pub fn new(
        registry: TransformRegistry,
        cache: ResolutionCache<R>,
        options: TransformOptions,
    ) -> Self {
        Self {
            registry,
            cache,
            options,
        }
    }

    pub fn cache(&self) -> &ResolutionCache<R> {
        &self.cache
    }

    pub fn options(&self) -> TransformOptions {
        self.options
    }

    /// Transform every record of the batch in place and hand the batch back
    pub async fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        self.apply_with_stats(records).await.0
    }

    /// Same as [`apply`](Self::apply), also reporting per-batch counters
    pub async fn apply_with_stats(&self, mut records: Vec<Record>) -> (Vec<Record>, ApplyStats) {
        let span = debug_span!("netbox_apply", batch_id = %Uuid::now_v7(), records = records.len());

        async move {
            let mut stats = ApplyStats::default();
            for record in records.iter_mut() {
                stats.merge(self.apply_record(record).await);
            }
            debug!(
                resolved = stats.resolved,
                failed = stats.failed,
                skipped = stats.skipped,
                "Batch transformed"
            );
            (records, stats)
        }
        .instrument(span)
        .await
    }

    async fn apply_record(&self, record: &mut Record) -> ApplyStats {
        let mut stats = ApplyStats::default();

        // Tags written below must not be picked up again in this pass.
        let original: Vec<(String, String)> = record
            .tags
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for (tag_key, tag_value) in original {
            match self.registry.transform_for(&tag_key) {
                Some(Transform::IpToDevice) => {
                    let resolved = self.ip_to_device(record, &tag_key, &tag_value).await;
                    if resolved {
                        stats.resolved += 1;
                    } else {
                        stats.failed += 1;
                    }
                    if self.options.removes_original(resolved) {
                        record.remove_tag(&tag_key);
                    }
                }
                None => {
                    debug!("No supported transform found for tag key: {}", tag_key);
                    stats.skipped += 1;
                }
            }
        }

        stats
    }

    async fn ip_to_device(&self, record: &mut Record, tag_key: &str, ip: &str) -> bool {
        match self.cache.get(ip).await {
            Ok(resolved) => {
                for (key, value) in derived_tags(tag_key, &resolved) {
                    record.add_tag(key, value);
                }
                true
            }
            Err(e) => {
                warn!(
                    "Unable to get NetBox data for {}={} on {}: {}",
                    tag_key, ip, record.name, e
                );
                false
            }
        }
    }
}
