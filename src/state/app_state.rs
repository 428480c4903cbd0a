use std::sync::Arc;

use tracing::info;

use crate::billing::BillingClient;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::services::catalog::Catalog;
use crate::services::mailer::Mailer;
use crate::state::security_config::SecurityConfig;
use crate::storage::{FileStore, Kv, RedisStore};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Storage handle; redis in production, flat file in development
    pub kv: Kv,
    /// Security configuration for session signing
    pub security: SecurityConfig,
    pub config: AppConfig,
    pub billing: BillingClient,
    pub mailer: Mailer,
    pub catalog: Catalog,
}

impl AppState {
    pub fn new(
        kv: Kv,
        security: SecurityConfig,
        config: AppConfig,
        billing: BillingClient,
        mailer: Mailer,
        catalog: Catalog,
    ) -> Self {
        Self {
            kv,
            security,
            config,
            billing,
            mailer,
            catalog,
        }
    }

    /// Build the full state from configuration: pick the storage backend,
    /// load the tool registry and construct the outbound clients.
    pub async fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let kv = match &config.redis_url {
            Some(url) => {
                let store = RedisStore::connect(url).await?;
                info!("storage backend: redis");
                Kv::new(Arc::new(store))
            }
            None => {
                let store = FileStore::open(&config.data_dir)?;
                info!(data_dir = %config.data_dir.display(), "storage backend: file");
                Kv::new(Arc::new(store))
            }
        };

        let security = SecurityConfig::new(config.session_secret.as_bytes());
        let billing = BillingClient::from_config(&config)?;
        let mailer = Mailer::from_config(&config);
        let catalog = Catalog::load(&config.registry_path);

        Ok(Self::new(kv, security, config, billing, mailer, catalog))
    }
}
