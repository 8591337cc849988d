// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-netbox-enrichment
//!
//! Provides NetBox response bodies, in-memory transports and resolvers so that
//! no test ever opens a socket.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use cim_netbox_enrichment::{
    DeviceResolver, InventoryElement, InventoryTransport, NetBoxError, NetBoxResult,
    ResolutionCache, ResolvedDevice, TagTransformer, TransformOptions, TransformRegistry,
    IP_TO_DEVICE,
};

pub const API_BASE: &str = "https://netbox.example.net/api";

/// Address search response as returned by NetBox for 141.193.3.5/32
pub const IP_SEARCH_BODY: &str = r#"{"count":1,"next":null,"previous":null,"results":[{"id":1531,"family":4,"address":"141.193.3.5/32","vrf":null,"tenant":null,"status":{"value":1,"label":"Active"},"role":null,"interface":{"id":42419,"device":{"id":1019,"url":"https://netbox.example.net/api/dcim/devices/1019/","name":"br1-sjc1","display_name":"br1-sjc1"},"name":"lo0.0","form_factor":{"value":0,"label":"Virtual"},"enabled":true,"lag":null,"mtu":null,"mac_address":null,"mgmt_only":false,"description":"","is_connected":false,"interface_connection":null,"circuit_termination":null},"description":"","nat_inside":null,"nat_outside":null,"custom_fields":{}}]}"#;

/// Device detail response carrying its site
pub const DEVICE_BODY: &str = r#"{"id":3706,"name":"br1-fra1","display_name":"br1-fra1","device_type":{"id":33,"url":"https://netbox.example.net/api/dcim/device-types/33/","manufacturer":{"id":5,"url":"https://netbox.example.net/api/dcim/manufacturers/5/","name":"Juniper","slug":"juniper"},"model":"PTX1000","slug":"ptx1000"},"device_role":{"id":58,"url":"https://netbox.example.net/api/dcim/device-roles/58/","name":"border-router","slug":"border-router"},"tenant":null,"platform":{"id":3,"url":"https://netbox.example.net/api/dcim/platforms/3/","name":"Junos","slug":"junos"},"serial":"DQ077","asset_tag":"AAAAAAACDP","site":{"id":14,"url":"https://netbox.example.net/api/dcim/sites/14/","name":"fra1","slug":"fra1"},"rack":{"id":230,"url":"https://netbox.example.net/api/dcim/racks/230/","name":"AF04","display_name":"AF04 (FR6:02:202073.101)"},"position":28,"face":{"value":0,"label":"Front"},"parent_device":null,"status":{"value":1,"label":"Active"},"primary_ip":{"id":5306,"url":"https://netbox.example.net/api/ipam/ip-addresses/5306/","family":4,"address":"141.193.3.9/32"},"primary_ip4":{"id":5306,"url":"https://netbox.example.net/api/ipam/ip-addresses/5306/","family":4,"address":"141.193.3.9/32"},"primary_ip6":null,"cluster":null,"comments":"","custom_fields":{"ASN":22697,"design_rev":"br-pop-ptx-revA"}}"#;

/// Topology the scenario tests seed into the cache
pub const SJC: (&str, &str, &str, &str) = ("141.193.3.5", "br1-sjc1", "sjc1", "US_WEST");
pub const IAD: (&str, &str, &str, &str) = ("12.100.16.2", "br1-iad1", "ash1", "US_EAST");

pub fn element(id: i64, kind: &str, name: &str) -> InventoryElement {
    InventoryElement::new(id, name, format!("{}/dcim/{}s/{}/", API_BASE, kind, id))
}

pub fn resolved(device: &str, site: &str, region: &str, at: DateTime<Utc>) -> ResolvedDevice {
    ResolvedDevice {
        device: element(1, "device", device),
        site: element(2, "site", site),
        region: element(3, "region", region),
        resolved_at: at,
    }
}

pub fn ago(duration: Duration) -> DateTime<Utc> {
    Utc::now() - chrono::Duration::from_std(duration).expect("duration in range")
}

// ============================================================================
// In-memory NetBox
// ============================================================================

/// Serves NetBox documents from memory, recording every requested URL
#[derive(Default)]
pub struct FakeNetBox {
    documents: HashMap<String, NetBoxResult<String>>,
    requests: Mutex<Vec<String>>,
}

impl FakeNetBox {
    /// Register the three documents resolving `ip` to `device`/`site`/`region`
    pub fn with_topology(mut self, ip: &str, device: &str, site: &str, region: &str) -> Self {
        let device_url = format!("{}/dcim/devices/{}/", API_BASE, device);
        let site_url = format!("{}/dcim/sites/{}/", API_BASE, site);
        let region_url = format!("{}/dcim/regions/{}/", API_BASE, region);

        self.documents.insert(
            search_url(ip),
            Ok(format!(
                r#"{{"count":1,"results":[{{"interface":{{"device":{{"id":1,"name":"{}","url":"{}"}}}}}}]}}"#,
                device, device_url
            )),
        );
        self.documents.insert(
            device_url,
            Ok(format!(
                r#"{{"id":1,"name":"{}","site":{{"id":2,"name":"{}","url":"{}"}}}}"#,
                device, site, site_url
            )),
        );
        self.documents.insert(
            site_url,
            Ok(format!(
                r#"{{"id":2,"name":"{}","region":{{"id":3,"name":"{}","url":"{}"}}}}"#,
                site, region, region_url
            )),
        );
        self
    }

    /// Replace whatever is served at `url` with an error
    pub fn failing_at(mut self, url: &str, error: NetBoxError) -> Self {
        self.documents.insert(url.to_string(), Err(error));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }
}

pub fn search_url(ip: &str) -> String {
    format!("{}/ipam/ip-addresses/?q={}%2F32", API_BASE, ip)
}

#[async_trait]
impl InventoryTransport for FakeNetBox {
    async fn get(&self, url: &str) -> NetBoxResult<Vec<u8>> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(url.to_string());
        match self.documents.get(url) {
            Some(Ok(body)) => Ok(body.clone().into_bytes()),
            Some(Err(e)) => Err(e.clone()),
            None => Err(NetBoxError::HttpStatus {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}

// ============================================================================
// Resolvers
// ============================================================================

/// Resolver answering from a fixed table, counting calls
#[derive(Default)]
pub struct StaticResolver {
    table: HashMap<String, (String, String, String)>,
    unreachable: HashSet<String>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl StaticResolver {
    pub fn with(mut self, (ip, device, site, region): (&str, &str, &str, &str)) -> Self {
        self.table.insert(
            ip.to_string(),
            (device.to_string(), site.to_string(), region.to_string()),
        );
        self
    }

    pub fn unreachable(mut self, ip: &str) -> Self {
        self.unreachable.insert(ip.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceResolver for StaticResolver {
    async fn resolve(&self, ip: &str) -> NetBoxResult<ResolvedDevice> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.unreachable.contains(ip) {
            return Err(NetBoxError::Transport(format!("connect to NetBox for {} timed out", ip)));
        }
        match self.table.get(ip) {
            Some((device, site, region)) => Ok(resolved(device, site, region, Utc::now())),
            None => Err(NetBoxError::EmptyResult(search_url(ip))),
        }
    }
}

// ============================================================================
// Transformers
// ============================================================================

pub fn ip_to_device_registry(tags: &[&str]) -> TransformRegistry {
    let transforms: BTreeMap<String, Vec<String>> = [(
        IP_TO_DEVICE.to_string(),
        tags.iter().map(|t| t.to_string()).collect::<Vec<_>>(),
    )]
    .into_iter()
    .collect();
    TransformRegistry::from_config(&transforms)
}

pub fn transformer(
    resolver: StaticResolver,
    options: TransformOptions,
) -> TagTransformer<StaticResolver> {
    TagTransformer::new(
        ip_to_device_registry(&["source-address", "destination-address"]),
        ResolutionCache::new(resolver, Duration::from_secs(3600)),
        options,
    )
}

/// Transformer whose cache already knows both scenario addresses and whose
/// resolver knows nothing, so any cache miss shows up as a failure
pub async fn seeded_transformer(options: TransformOptions) -> TagTransformer<StaticResolver> {
    let transformer = transformer(StaticResolver::default(), options);
    for (ip, device, site, region) in [SJC, IAD] {
        transformer
            .cache()
            .seed(ip, resolved(device, site, region, Utc::now()))
            .await;
    }
    transformer
}
