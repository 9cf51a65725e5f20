use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::Gym;
use crate::services::postgres::{PostgresClient, PostgresError};

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache load failed: {0}")]
    LoadError(Arc<PostgresError>),
}

impl From<Arc<PostgresError>> for CacheError {
    fn from(err: Arc<PostgresError>) -> Self {
        CacheError::LoadError(err)
    }
}

/// In-process TTL cache for gym directory reads
///
/// Concurrent misses for the same key share one database load.
#[derive(Clone)]
pub struct GymCache {
    directory: Cache<String, Arc<Vec<Gym>>>,
    gyms: Cache<String, Arc<Gym>>,
}

impl GymCache {
    pub fn new(max_entries: u64, ttl_secs: u64) -> Self {
        let ttl = Duration::from_secs(ttl_secs);

        Self {
            directory: Cache::builder()
                .max_capacity(1)
                .time_to_live(ttl)
                .build(),
            gyms: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Every gym ordered by name
    pub async fn all_gyms(&self, store: &PostgresClient) -> Result<Arc<Vec<Gym>>, CacheError> {
        let key = CacheKey::all_gyms();
        let gyms = self
            .directory
            .try_get_with(key.clone(), async {
                tracing::trace!("Cache miss: {}", key);
                store.list_gyms().await.map(Arc::new)
            })
            .await?;
        Ok(gyms)
    }

    /// One gym; misses are not cached
    pub async fn gym(&self, store: &PostgresClient, id: uuid::Uuid) -> Result<Option<Arc<Gym>>, CacheError> {
        let key = CacheKey::gym(&id.to_string());
        let loaded = self
            .gyms
            .try_get_with(key.clone(), async {
                tracing::trace!("Cache miss: {}", key);
                match store.get_gym(id).await {
                    Ok(Some(gym)) => Ok(Arc::new(gym)),
                    Ok(None) => Err(PostgresError::NotFound(format!("Gym {}", id))),
                    Err(err) => Err(err),
                }
            })
            .await;

        match loaded {
            Ok(gym) => Ok(Some(gym)),
            Err(err) if matches!(*err, PostgresError::NotFound(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Drop everything after a gym write
    pub fn invalidate(&self) {
        self.directory.invalidate_all();
        self.gyms.invalidate_all();
        tracing::debug!("Invalidated gym cache");
    }

    pub fn entry_count(&self) -> u64 {
        self.directory.entry_count() + self.gyms.entry_count()
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build the key for the full directory listing
    pub fn all_gyms() -> String {
        "gyms:all".to_string()
    }

    /// Build the key for a single gym
    pub fn gym(gym_id: &str) -> String {
        format!("gym:{}", gym_id)
    }
}
