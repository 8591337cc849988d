// Copyright (c) 2025 - Cowboy AI, Inc.
//! NetBox Enricher
//!
//! Reads telemetry records as newline-delimited JSON on stdin, enriches their
//! address tags with NetBox device/site/region data and writes them to stdout.
//!
//! ```text
//! stdin (NDJSON) → batch → TagTransformer → stdout (NDJSON)
//! ```
//!
//! Run with: cargo run --bin netbox-enricher < records.ndjson
//!
//! Configuration:
//! - `NETBOX_CONFIG`: path to a JSON configuration file, or
//! - `NETBOX_ADDR`, `NETBOX_API_TOKEN`, `NETBOX_ENTRY_TTL`, ... (see `EnrichmentConfig::from_env`)
//! - `NETBOX_BATCH_SIZE`: records per batch (default 100)

use anyhow::{Context, Result};
use cim_netbox_enrichment::{EnrichmentConfig, Record, TagTransformer};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

const DEFAULT_BATCH_SIZE: usize = 100;

async fn load_config() -> Result<EnrichmentConfig> {
    match std::env::var("NETBOX_CONFIG") {
        Ok(path) => {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path))?;
            EnrichmentConfig::from_json_str(&raw).context("Failed to parse configuration file")
        }
        Err(_) => EnrichmentConfig::from_env()
            .context("Failed to load configuration from environment"),
    }
}

async fn flush_batch(
    transformer: &TagTransformer,
    batch: &mut Vec<Record>,
    stdout: &mut tokio::io::Stdout,
    totals: &mut (u64, u64),
) -> Result<()> {
    if batch.is_empty() {
        return Ok(());
    }

    let (records, stats) = transformer.apply_with_stats(std::mem::take(batch)).await;
    totals.0 += stats.resolved as u64;
    totals.1 += stats.failed as u64;

    for record in &records {
        let mut line = serde_json::to_vec(record).context("Failed to serialize record")?;
        line.push(b'\n');
        stdout.write_all(&line).await.context("Failed to write record")?;
    }
    stdout.flush().await?;

    let purged = transformer.cache().purge_stale().await;

    info!(
        "📊 Batch of {} records: {} resolved, {} failed (total: {} resolved, {} failed, {} stale purged)",
        records.len(),
        stats.resolved,
        stats.failed,
        totals.0,
        totals.1,
        purged
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, stdout carries records
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("🚀 Starting NetBox Enricher");

    let config = load_config().await?;
    let batch_size = std::env::var("NETBOX_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|n: &usize| *n > 0)
        .unwrap_or(DEFAULT_BATCH_SIZE);

    let transformer =
        TagTransformer::from_config(&config).context("Failed to create NetBox transformer")?;

    info!("📋 Configuration loaded:");
    info!("  - NetBox API: {}", config.api_base());
    info!("  - Entry TTL: {:?}", transformer.cache().ttl());
    info!("  - Preserve original: {}", config.preserve_original);
    info!("  - Transforms: {:?}", config.transforms);
    info!("  - Batch size: {}", batch_size);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut batch = Vec::with_capacity(batch_size);
    let mut totals = (0u64, 0u64);
    let mut rejected = 0u64;

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Record>(&line) {
            Ok(record) => {
                debug!("📨 Received record: {}", record.name);
                batch.push(record);
            }
            Err(e) => {
                rejected += 1;
                error!("❌ Failed to parse record: {} (total rejected: {})", e, rejected);
                continue;
            }
        }

        if batch.len() >= batch_size {
            flush_batch(&transformer, &mut batch, &mut stdout, &mut totals).await?;
        }
    }

    flush_batch(&transformer, &mut batch, &mut stdout, &mut totals).await?;

    if rejected > 0 {
        warn!("⚠️ {} input lines were not valid records", rejected);
    }
    info!(
        "✅ Input exhausted: {} resolved, {} failed, {} cached addresses",
        totals.0,
        totals.1,
        transformer.cache().len().await
    );
    Ok(())
}
