//! In-memory store implementation using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

use shopfront_core::config::store::MemoryStoreConfig;
use shopfront_core::result::AppResult;
use shopfront_core::traits::store::TransientStore;

/// A stored value together with its own TTL.
#[derive(Debug, Clone)]
struct Record {
    value: String,
    ttl: Duration,
}

/// Expiry policy that honours each record's own TTL, resetting it on
/// overwrite (sliding expiration at the record level).
struct RecordExpiry;

impl Expiry<String, Record> for RecordExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        record: &Record,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(record.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        record: &Record,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(record.ttl)
    }
}

/// In-memory store provider using moka with per-record TTL.
#[derive(Debug, Clone)]
pub struct MemoryStoreProvider {
    /// The underlying moka cache.
    cache: Cache<String, Record>,
}

impl MemoryStoreProvider {
    /// Create a new in-memory store from configuration.
    pub fn new(config: &MemoryStoreConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(RecordExpiry)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl TransientStore for MemoryStoreProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await.map(|record| record.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let record = Record {
            value: value.to_string(),
            ttl,
        };
        self.cache.insert(key.to_string(), record).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.contains_key(key))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
