// Copyright (c) 2025 - Cowboy AI, Inc.
//! Enrichment configuration
//!
//! Configuration is plain data: it can be deserialized from JSON, built in code,
//! or loaded from `NETBOX_*` environment variables. Nothing here talks to NetBox.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

use crate::errors::{NetBoxError, NetBoxResult};
use crate::transform::IP_TO_DEVICE;

/// Cache entry TTL used when none (or an unparsable one) is configured
pub const DEFAULT_ENTRY_TTL: Duration = Duration::from_secs(4 * 60 * 60);

/// TLS trust policy toward the NetBox endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsPolicy {
    /// Skip server certificate validation (internal NetBox with self-signed certs)
    #[default]
    AcceptInvalidCerts,
    /// Validate the server certificate chain
    Verify,
}

/// Configuration for NetBox tag enrichment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// NetBox host (e.g., "netbox.example.net") or base URL with scheme
    pub netbox_addr: String,

    /// API token, sent verbatim in the Authorization header
    pub netbox_token: String,

    /// Keep the original address tag next to the derived tags
    #[serde(default)]
    pub preserve_original: bool,

    /// Keep the original tag when its resolution failed, even if
    /// `preserve_original` is false
    #[serde(default)]
    pub keep_original_on_failure: bool,

    /// Cache entry TTL in duration syntax ("4h", "90m", "1h30m")
    #[serde(default)]
    pub entry_ttl: String,

    /// Transform name to the tag keys it applies to
    #[serde(default = "default_transforms")]
    pub transforms: BTreeMap<String, Vec<String>>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Certificate validation toward NetBox
    #[serde(default)]
    pub tls: TlsPolicy,
}

fn default_timeout() -> u64 {
    30
}

fn default_transforms() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([(
        IP_TO_DEVICE.to_string(),
        vec![
            "source-address".to_string(),
            "destination-address".to_string(),
        ],
    )])
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            netbox_addr: "netbox.local".to_string(),
            netbox_token: String::new(),
            preserve_original: false,
            keep_original_on_failure: false,
            entry_ttl: "4h".to_string(),
            transforms: default_transforms(),
            timeout_secs: default_timeout(),
            tls: TlsPolicy::default(),
        }
    }
}

impl EnrichmentConfig {
    /// Load configuration from a JSON document
    pub fn from_json_str(json: &str) -> NetBoxResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| NetBoxError::Configuration(format!("Invalid configuration: {}", e)))
    }

    /// Load configuration from `NETBOX_*` environment variables
    pub fn from_env() -> NetBoxResult<Self> {
        let defaults = Self::default();

        let netbox_token = std::env::var("NETBOX_API_TOKEN")
            .map_err(|_| NetBoxError::Configuration("NETBOX_API_TOKEN not set".to_string()))?;

        let transforms = match std::env::var("NETBOX_TRANSFORMS") {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                NetBoxError::Configuration(format!("Invalid NETBOX_TRANSFORMS: {}", e))
            })?,
            Err(_) => defaults.transforms,
        };

        let tls = if env_flag("NETBOX_VERIFY_TLS").unwrap_or(false) {
            TlsPolicy::Verify
        } else {
            TlsPolicy::AcceptInvalidCerts
        };

        Ok(Self {
            netbox_addr: std::env::var("NETBOX_ADDR").unwrap_or(defaults.netbox_addr),
            netbox_token,
            preserve_original: env_flag("NETBOX_PRESERVE_ORIGINAL").unwrap_or(false),
            keep_original_on_failure: env_flag("NETBOX_KEEP_ORIGINAL_ON_FAILURE")
                .unwrap_or(false),
            entry_ttl: std::env::var("NETBOX_ENTRY_TTL").unwrap_or(defaults.entry_ttl),
            transforms,
            timeout_secs: std::env::var("NETBOX_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            tls,
        })
    }

    /// Base URL of the NetBox REST API, e.g. `https://netbox.example.net/api`
    pub fn api_base(&self) -> String {
        let addr = self.netbox_addr.trim_end_matches('/');
        if addr.contains("://") {
            format!("{}/api", addr)
        } else {
            format!("https://{}/api", addr)
        }
    }

    /// Effective cache entry TTL, falling back to [`DEFAULT_ENTRY_TTL`]
    pub fn entry_ttl(&self) -> Duration {
        match parse_duration(&self.entry_ttl) {
            Ok(ttl) => ttl,
            Err(e) => {
                warn!(
                    "Invalid or no cache TTL specified ({}), using default 4h",
                    e
                );
                DEFAULT_ENTRY_TTL
            }
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    parse_flag(name, &value)
}

fn parse_flag(name: &str, value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!("Ignoring unrecognised value '{}' for {}", value, name);
            None
        }
    }
}

/// Parse a duration such as `4h`, `1h30m`, `1.5h`, `300ms` or `45s`
///
/// Units: `ns`, `us`, `µs`, `ms`, `s`, `m`, `h`. Every number needs a unit,
/// except a bare `0`.
pub fn parse_duration(input: &str) -> NetBoxResult<Duration> {
    let invalid = || NetBoxError::Configuration(format!("invalid duration '{}'", input));

    let s = input.trim();
    if s.is_empty() {
        return Err(invalid());
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut rest = s;
    let mut total_nanos: f64 = 0.0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(invalid)?;
        if number_len == 0 {
            return Err(invalid());
        }
        let value: f64 = rest[..number_len].parse().map_err(|_| invalid())?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60.0 * 1e9,
            "h" => 3600.0 * 1e9,
            _ => return Err(invalid()),
        };
        rest = &rest[unit_len..];

        total_nanos += value * nanos_per_unit;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(Duration::from_nanos(total_nanos.round() as u64))
}
