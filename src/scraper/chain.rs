use std::collections::BTreeMap;

use super::{GymSource, ScrapedGym};
use crate::core::dedup::remove_duplicates;

/// Outcome of a fallback chain run
#[derive(Debug)]
pub struct ChainResult {
    /// Source that produced the gyms, `None` when every source came back empty
    pub source: Option<String>,
    pub gyms: Vec<ScrapedGym>,
}

/// Try each source in order and keep the first non-empty result
///
/// A failing source is logged and treated as empty, so the chain always
/// moves on to the next one.
pub async fn first_non_empty(sources: &[&dyn GymSource]) -> ChainResult {
    for source in sources {
        tracing::info!("Trying source: {}", source.name());

        match source.fetch().await {
            Ok(gyms) if !gyms.is_empty() => {
                tracing::info!("Found {} gyms via {}", gyms.len(), source.name());
                return ChainResult {
                    source: Some(source.name().to_string()),
                    gyms,
                };
            }
            Ok(_) => tracing::info!("{} returned no gyms, falling back", source.name()),
            Err(e) => tracing::warn!("{} failed, falling back: {}", source.name(), e),
        }
    }

    ChainResult {
        source: None,
        gyms: Vec::new(),
    }
}

/// Concatenate every source's gyms in order and drop duplicates
pub async fn merge_all(sources: &[&dyn GymSource]) -> Vec<ScrapedGym> {
    let mut all = Vec::new();

    for source in sources {
        match source.fetch().await {
            Ok(gyms) => {
                tracing::info!("Found {} gyms via {}", gyms.len(), source.name());
                all.extend(gyms);
            }
            Err(e) => tracing::error!("{} failed: {}", source.name(), e),
        }
    }

    let total = all.len();
    let unique = remove_duplicates(all);
    tracing::info!("Total unique gyms: {} (from {} records)", unique.len(), total);
    unique
}

/// Number of gyms contributed by each source label
pub fn source_breakdown(gyms: &[ScrapedGym]) -> BTreeMap<String, usize> {
    let mut breakdown = BTreeMap::new();
    for gym in gyms {
        *breakdown.entry(gym.source.clone()).or_insert(0) += 1;
    }
    breakdown
}
