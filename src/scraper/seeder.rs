use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;

use super::chain::{first_non_empty, merge_all, source_breakdown};
use super::{GymSource, ScrapeError, ScrapedGym};
use crate::services::{GymInsert, PostgresClient, PostgresError};

/// Where seeded gyms end up
#[async_trait]
pub trait GymSink: Send + Sync {
    /// Remove existing gyms whose name contains `fragment`
    async fn clear_named_like(&self, fragment: &str) -> Result<u64, PostgresError>;

    /// Insert `gyms` in statements of `batch_size` rows
    async fn insert_batches(&self, gyms: &[GymInsert], batch_size: usize) -> Result<usize, PostgresError>;
}

#[async_trait]
impl GymSink for PostgresClient {
    async fn clear_named_like(&self, fragment: &str) -> Result<u64, PostgresError> {
        self.delete_gyms_named_like(fragment).await
    }

    async fn insert_batches(&self, gyms: &[GymInsert], batch_size: usize) -> Result<usize, PostgresError> {
        self.insert_gyms(gyms, batch_size).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedMode {
    /// First non-empty source wins
    Chain,
    /// Every source merged and deduplicated
    Merge,
}

/// Summary of one seeding run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub mode: SeedMode,
    pub found: usize,
    pub inserted: usize,
    pub deleted: u64,
    pub dry_run: bool,
    pub sources: BTreeMap<String, usize>,
}

/// Runs the scraping sources and stores what they find
pub struct Seeder<'a> {
    sink: Option<&'a dyn GymSink>,
    brand: String,
    chain_batch: usize,
    merge_batch: usize,
}

impl<'a> Seeder<'a> {
    /// `sink` of `None` is a dry run: gyms are collected and reported only
    pub fn new(sink: Option<&'a dyn GymSink>, brand: &str, chain_batch: usize, merge_batch: usize) -> Self {
        Self {
            sink,
            brand: brand.to_string(),
            chain_batch,
            merge_batch,
        }
    }

    /// Chain mode: the first source with results is stored
    pub async fn run_chain(&self, sources: &[&dyn GymSource]) -> Result<SeedReport, ScrapeError> {
        let result = first_non_empty(sources).await;

        match &result.source {
            Some(source) => tracing::info!("Using {} gyms from {}", result.gyms.len(), source),
            None => tracing::warn!("Every source came back empty"),
        }

        let inserted = self.store(&result.gyms, self.chain_batch).await?;

        Ok(SeedReport {
            mode: SeedMode::Chain,
            found: result.gyms.len(),
            inserted,
            deleted: 0,
            dry_run: self.sink.is_none(),
            sources: source_breakdown(&result.gyms),
        })
    }

    /// Merge mode: existing brand gyms are replaced by every source's results
    pub async fn run_merge(&self, sources: &[&dyn GymSource]) -> Result<SeedReport, ScrapeError> {
        let gyms = merge_all(sources).await;
        let sources = source_breakdown(&gyms);

        for (source, count) in &sources {
            tracing::info!("  {}: {} gyms", source, count);
        }

        let deleted = match self.sink {
            Some(sink) if !gyms.is_empty() => match sink.clear_named_like(&self.brand).await {
                Ok(deleted) => deleted,
                Err(e) => {
                    tracing::warn!("Could not clear existing {} gyms: {}", self.brand, e);
                    0
                }
            },
            _ => 0,
        };

        let inserted = self.store(&gyms, self.merge_batch).await?;

        Ok(SeedReport {
            mode: SeedMode::Merge,
            found: gyms.len(),
            inserted,
            deleted,
            dry_run: self.sink.is_none(),
            sources,
        })
    }

    async fn store(&self, gyms: &[ScrapedGym], batch_size: usize) -> Result<usize, ScrapeError> {
        let Some(sink) = self.sink else {
            tracing::info!("Dry run, skipping insert of {} gyms", gyms.len());
            return Ok(0);
        };

        if gyms.is_empty() {
            return Ok(0);
        }

        let rows: Vec<GymInsert> = gyms.iter().map(ScrapedGym::to_insert).collect();
        let inserted = sink.insert_batches(&rows, batch_size).await?;

        tracing::info!("Stored {} gyms", inserted);
        Ok(inserted)
    }
}
