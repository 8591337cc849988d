// Copyright (c) 2025 - Cowboy AI, Inc.
//! HTTP side of NetBox resolution

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{DeviceResolver, ElementKind, InventoryElement, ResolvedDevice};
use crate::config::{EnrichmentConfig, TlsPolicy};
use crate::errors::{NetBoxError, NetBoxResult};

/// Read-only access to NetBox documents by absolute URL
#[async_trait]
pub trait InventoryTransport: Send + Sync {
    /// GET `url` and return the raw response body of a 2xx answer
    async fn get(&self, url: &str) -> NetBoxResult<Vec<u8>>;
}

/// `reqwest`-backed transport carrying the NetBox token on every request
pub struct HttpInventoryTransport {
    client: Client,
}

impl HttpInventoryTransport {
    /// Build the HTTP client from configuration
    pub fn new(config: &EnrichmentConfig) -> NetBoxResult<Self> {
        // NetBox expects the token verbatim, without a "Token " scheme prefix here
        let mut token = HeaderValue::from_str(&config.netbox_token)
            .map_err(|e| NetBoxError::Configuration(format!("Invalid API token: {}", e)))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, token);

        let accept_invalid_certs = config.tls == TlsPolicy::AcceptInvalidCerts;
        if accept_invalid_certs {
            warn!(
                "TLS certificate validation toward NetBox at {} is disabled",
                config.netbox_addr
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| {
                NetBoxError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl InventoryTransport for HttpInventoryTransport {
    async fn get(&self, url: &str) -> NetBoxResult<Vec<u8>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetBoxError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Resolves addresses through the three-hop NetBox lookup chain
pub struct ResolutionClient<T = HttpInventoryTransport> {
    api_base: String,
    transport: T,
}

impl ResolutionClient<HttpInventoryTransport> {
    /// Create a client talking to the NetBox instance named in `config`
    pub fn from_config(config: &EnrichmentConfig) -> NetBoxResult<Self> {
        let transport = HttpInventoryTransport::new(config)?;
        info!("Resolving addresses against NetBox at {}", config.api_base());
        Ok(Self::new(config.api_base(), transport))
    }
}

impl<T: InventoryTransport> ResolutionClient<T> {
    pub fn new(api_base: impl Into<String>, transport: T) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Address search URL for a single host address
    pub fn address_query_url(&self, ip: &str) -> String {
        format!(
            "{}/ipam/ip-addresses/?q={}",
            self.api_base,
            urlencoding::encode(&format!("{}/32", ip))
        )
    }

    async fn fetch(&self, kind: ElementKind, url: &str) -> NetBoxResult<InventoryElement> {
        let body = self.transport.get(url).await?;
        let element = InventoryElement::parse(kind, &body).map_err(|e| match e {
            NetBoxError::EmptyResult(_) => NetBoxError::EmptyResult(url.to_string()),
            other => other,
        })?;
        debug!("Resolved {} {} ({}) from {}", kind, element.name, element.id, url);
        Ok(element)
    }
}

#[async_trait]
impl<T: InventoryTransport> DeviceResolver for ResolutionClient<T> {
    async fn resolve(&self, ip: &str) -> NetBoxResult<ResolvedDevice> {
        let device = self
            .fetch(ElementKind::Device, &self.address_query_url(ip))
            .await?;
        let site = self.fetch(ElementKind::Site, &device.url).await?;
        let region = self.fetch(ElementKind::Region, &site.url).await?;

        Ok(ResolvedDevice {
            device,
            site,
            region,
            resolved_at: Utc::now(),
        })
    }
}
