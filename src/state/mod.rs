pub mod app_state;
pub mod security_config;

pub use app_state::AppState;
pub use security_config::SecurityConfig;

/// Assemble an `AppState` around a test storage handle. The outbound
/// clients are real but point nowhere a unit test will reach.
#[cfg(test)]
pub(crate) fn test_state(kv: crate::storage::Kv, security: SecurityConfig) -> AppState {
    let config = crate::config::AppConfig::test_default();
    let billing = crate::billing::BillingClient::from_config(&config).unwrap();
    let mailer = crate::services::mailer::Mailer::from_config(&config);
    let catalog = crate::services::catalog::Catalog::default();
    AppState::new(kv, security, config, billing, mailer, catalog)
}
