// Copyright (c) 2025 - Cowboy AI, Inc.
//! Transform registry
//!
//! Configuration lists transforms the way operators think about them
//! (`ip-to-device = ["source-address", "destination-address"]`), while the
//! engine asks the opposite question for every tag it sees. The registry is
//! inverted once at construction so each tag costs a single map lookup.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::warn;

/// Configuration name of the address → device/site/region transform
pub const IP_TO_DEVICE: &str = "ip-to-device";

/// Supported tag transforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transform {
    /// Replace an IP address with its parent device, site and region
    #[serde(rename = "ip-to-device")]
    IpToDevice,
}

impl Transform {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            IP_TO_DEVICE => Some(Transform::IpToDevice),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Transform::IpToDevice => IP_TO_DEVICE,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tag key → transform index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformRegistry {
    by_tag: HashMap<String, Transform>,
}

impl TransformRegistry {
    /// Invert a `transform-name → [tag keys]` mapping
    ///
    /// Unknown transform names are ignored. A tag key claimed by several
    /// transforms stays with the first one in name order.
    pub fn from_config(transforms: &BTreeMap<String, Vec<String>>) -> Self {
        let mut by_tag = HashMap::new();

        for (name, tags) in transforms {
            let Some(transform) = Transform::from_name(name) else {
                warn!("Ignoring unsupported transform '{}'", name);
                continue;
            };

            for tag in tags {
                if let Some(existing) = by_tag.get(tag) {
                    if *existing != transform {
                        warn!(
                            "Tag '{}' already handled by '{}', ignoring '{}'",
                            tag, existing, transform
                        );
                    }
                    continue;
                }
                by_tag.insert(tag.clone(), transform);
            }
        }

        Self { by_tag }
    }

    pub fn transform_for(&self, tag_key: &str) -> Option<Transform> {
        self.by_tag.get(tag_key).copied()
    }

    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}
