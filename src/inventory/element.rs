// Copyright (c) 2025 - Cowboy AI, Inc.
//! NetBox inventory element parsing
//!
//! Every hop of the resolution chain yields the same normalized triple:
//! the entity id, its display name and the absolute URL of its detail record.
//! Where that triple lives in the response depends on the kind of entity:
//!
//! ```text
//! Device: {"results": [{"interface": {"device": {id, name, url}}}]}
//! Site:   {"site":   {id, name, url}, ...}   (device detail body)
//! Region: {"region": {id, name, url}, ...}   (site detail body)
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::errors::{NetBoxError, NetBoxResult};

/// Entity kinds taking part in address resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Device,
    Site,
    Region,
}

impl ElementKind {
    /// JSON key under which NetBox nests this entity
    pub fn key(&self) -> &'static str {
        match self {
            ElementKind::Device => "device",
            ElementKind::Site => "site",
            ElementKind::Region => "region",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Normalized reference to a NetBox entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryElement {
    pub id: i64,
    pub name: String,
    /// Absolute URL of the entity's own detail record
    pub url: String,
}

impl InventoryElement {
    pub fn new(id: i64, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            url: url.into(),
        }
    }

    /// Parse one NetBox response body for the declared entity kind
    pub fn parse(kind: ElementKind, body: &[u8]) -> NetBoxResult<Self> {
        let root: Value = serde_json::from_slice(body)?;

        let holder = match kind {
            ElementKind::Device => {
                let results = root["results"].as_array().ok_or_else(|| {
                    NetBoxError::MalformedResponse("Missing 'results' array".to_string())
                })?;
                let first = results.first().ok_or_else(|| {
                    NetBoxError::EmptyResult("address search returned no results".to_string())
                })?;
                let interface = &first["interface"];
                if !interface.is_object() {
                    return Err(NetBoxError::MalformedResponse(
                        "Missing 'interface' object in first result".to_string(),
                    ));
                }
                interface
            }
            ElementKind::Site | ElementKind::Region => &root,
        };

        Self::from_object(kind, &holder[kind.key()])
    }

    fn from_object(kind: ElementKind, value: &Value) -> NetBoxResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            NetBoxError::MalformedResponse(format!("Missing '{}' object", kind))
        })?;

        let id = object
            .get("id")
            .and_then(integral_id)
            .ok_or_else(|| NetBoxError::MalformedResponse(format!("Missing '{}.id'", kind)))?;
        let name = object
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| NetBoxError::MalformedResponse(format!("Missing '{}.name'", kind)))?;
        let url = object
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| NetBoxError::MalformedResponse(format!("Missing '{}.url'", kind)))?;

        Ok(Self::new(id, name, url))
    }
}

// Older NetBox releases and some proxies emit ids as floats.
fn integral_id(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.is_finite())
            .map(|f| f as i64)
    })
}
