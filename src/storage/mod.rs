//! Key-value storage behind a single trait: Redis in production, a
//! flat-file document for local development. The backend is chosen once at
//! startup; everything above this module goes through [`Kv`].

pub mod file;
pub mod redis;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AppError;

pub use self::file::FileStore;
pub use self::redis::RedisStore;

/// Minimal contract both backends satisfy. Values are opaque strings;
/// typed access goes through [`Kv`].
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Store `value` under `key`. With a `ttl` the entry expires; without
    /// one it lives until overwritten or deleted.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// True for the production backend (Redis). The file store reports
    /// false; callers use this to accept its documented weaker guarantees
    /// (single-process assumption, best-effort expiry) rather than to
    /// change core semantics.
    fn is_durable(&self) -> bool;
}

/// Cloneable handle to the configured backend with typed JSON helpers.
#[derive(Clone)]
pub struct Kv {
    store: Arc<dyn KvStore>,
}

impl Kv {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub async fn get_raw(&self, key: &str) -> Result<Option<String>, AppError> {
        self.store.get(key).await
    }

    pub async fn set_raw(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), AppError> {
        self.store.set(key, value, ttl).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.store.get(key).await? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| AppError::storage(format!("corrupt value at {key}: {e}"))),
        }
    }

    pub async fn set_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), AppError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| AppError::internal(format!("serialize value for {key}: {e}")))?;
        self.store.set(key, &raw, ttl).await
    }

    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.store.delete(key).await
    }

    pub fn is_durable(&self) -> bool {
        self.store.is_durable()
    }
}
