//! Flat-file store for local development.
//!
//! Every key lives in one JSON document under the data directory. Reads
//! load the whole document; writes rewrite it through a temp file + rename
//! so a crash never leaves a half-written document. A process-local mutex
//! serializes access; concurrent processes are not coordinated, which is
//! why this backend reports `is_durable() == false`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::AppError;
use crate::storage::KvStore;
use crate::util::unix_ms;

#[derive(Debug, Serialize, Deserialize)]
struct FileEntry {
    value: String,
    /// Unix milliseconds; absent for entries without a TTL.
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<i64>,
}

type Document = BTreeMap<String, FileEntry>;

pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Open the store document under `data_dir`, creating the directory if
    /// needed. The document itself is created lazily on first write.
    pub fn open(data_dir: &Path) -> Result<Self, AppError> {
        fs::create_dir_all(data_dir)
            .map_err(|e| AppError::storage(format!("create data dir {}: {e}", data_dir.display())))?;
        Ok(Self {
            path: data_dir.join("kv.json"),
            lock: Mutex::new(()),
        })
    }

    fn load(&self) -> Result<Document, AppError> {
        if !self.path.exists() {
            return Ok(Document::new());
        }
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| AppError::storage(format!("read {}: {e}", self.path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| AppError::storage(format!("parse {}: {e}", self.path.display())))
    }

    fn persist(&self, doc: &Document) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| AppError::internal(format!("serialize store document: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .map_err(|e| AppError::storage(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| AppError::storage(format!("rename into {}: {e}", self.path.display())))
    }

    fn expired(entry: &FileEntry, now_ms: i64) -> bool {
        entry.expires_at.is_some_and(|at| at <= now_ms)
    }
}

#[async_trait]
impl KvStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let _guard = self.lock.lock();
        let doc = self.load()?;
        let now_ms = unix_ms(OffsetDateTime::now_utc());
        Ok(doc
            .get(key)
            .filter(|entry| !Self::expired(entry, now_ms))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), AppError> {
        let now_ms = unix_ms(OffsetDateTime::now_utc());
        let expires_at = ttl.map(|ttl| now_ms + ttl.as_millis() as i64);
        let _guard = self.lock.lock();
        let mut doc = self.load()?;
        // Writes double as the garbage collector for expired entries.
        doc.retain(|_, entry| !Self::expired(entry, now_ms));
        doc.insert(
            key.to_string(),
            FileEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        self.persist(&doc)
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let _guard = self.lock.lock();
        let mut doc = self.load()?;
        if doc.remove(key).is_some() {
            self.persist(&doc)?;
        }
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }
}
