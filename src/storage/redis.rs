//! Redis-backed store used in production deployments.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::error::AppError;
use crate::storage::KvStore;

/// Durable backend over a multiplexed Redis connection. The
/// `ConnectionManager` reconnects on its own, so one handle serves the
/// whole process lifetime; each operation clones it cheaply.
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        let client = Client::open(redis_url)
            .map_err(|e| AppError::config(format!("Invalid REDIS_URL: {e}")))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::storage(format!("redis connect: {e}")))?;
        Ok(Self { conn })
    }
}

fn backend_err(op: &str, e: redis::RedisError) -> AppError {
    AppError::storage(format!("redis {op}: {e}"))
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(|e| backend_err("get", e))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        match ttl {
            // Redis rejects a zero expiry, so clamp to one second.
            Some(ttl) => conn
                .set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
                .await
                .map_err(|e| backend_err("setex", e)),
            None => conn
                .set::<_, _, ()>(key, value)
                .await
                .map_err(|e| backend_err("set", e)),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| backend_err("del", e))
    }

    fn is_durable(&self) -> bool {
        true
    }
}
