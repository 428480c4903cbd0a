//! Centralized application configuration loaded from environment variables.
//!
//! This module provides a unified `AppConfig` struct that consolidates all
//! configuration values from environment variables, so nothing else in the
//! codebase reads `env::var` at call sites.

use std::env;
use std::path::PathBuf;

use crate::error::AppError;

/// Deployment environment. Gates the cookie `Secure` attribute and the
/// dev-login route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    Dev,
    Prod,
}

impl RuntimeEnv {
    fn from_env() -> Self {
        match env::var("RUNTIME_ENV") {
            Ok(v) if v.eq_ignore_ascii_case("prod") => RuntimeEnv::Prod,
            _ => RuntimeEnv::Dev,
        }
    }

    pub fn is_prod(self) -> bool {
        matches!(self, RuntimeEnv::Prod)
    }
}

/// Centralized application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Server configuration
    pub host: String,
    pub port: u16,
    /// External URL the frontend is served from; used for login links and
    /// redirect targets.
    pub public_base_url: String,
    pub runtime_env: RuntimeEnv,

    // Security configuration
    pub session_secret: String,

    // Storage configuration: Redis when set, flat-file store otherwise
    pub redis_url: Option<String>,
    pub data_dir: PathBuf,

    // Tool catalog
    pub registry_path: PathBuf,
    pub downloads_dir: PathBuf,

    // Billing provider
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub stripe_price_id: String,

    // Email delivery (optional; login links are logged when absent)
    pub resend_api_key: Option<String>,
    pub email_from: String,
}

impl AppConfig {
    /// Load and validate all configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        Self::validate_required_env()?;

        let host = env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port_str = env::var("BACKEND_PORT").unwrap_or_else(|_| "8080".to_string());
        let port = port_str.parse::<u16>().map_err(|_| {
            AppError::config(format!(
                "BACKEND_PORT must be a valid port number, got '{port_str}'"
            ))
        })?;

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let runtime_env = RuntimeEnv::from_env();

        // validate_required_env already checked presence and length
        let session_secret = env::var("SESSION_SECRET")?;

        let redis_url = env::var("REDIS_URL").ok().filter(|v| !v.is_empty());
        let data_dir = PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()));

        let registry_path = PathBuf::from(
            env::var("TOOLS_REGISTRY_PATH")
                .unwrap_or_else(|_| "public/tools-generated.json".to_string()),
        );
        let downloads_dir = PathBuf::from(
            env::var("DOWNLOADS_DIR").unwrap_or_else(|_| "public/downloads".to_string()),
        );

        let stripe_secret_key = env::var("STRIPE_SECRET_KEY")?;
        let stripe_webhook_secret = env::var("STRIPE_WEBHOOK_SECRET")?;
        let stripe_price_id = env::var("STRIPE_PRICE_ID")?;

        let resend_api_key = env::var("RESEND_API_KEY").ok().filter(|v| !v.is_empty());
        let email_from = env::var("EMAIL_FROM")
            .unwrap_or_else(|_| "Toolgate <noreply@toolgate.local>".to_string());

        Ok(AppConfig {
            host,
            port,
            public_base_url,
            runtime_env,
            session_secret,
            redis_url,
            data_dir,
            registry_path,
            downloads_dir,
            stripe_secret_key,
            stripe_webhook_secret,
            stripe_price_id,
            resend_api_key,
            email_from,
        })
    }

    /// Validate critical environment variables at startup
    fn validate_required_env() -> Result<(), AppError> {
        // SESSION_SECRET: required, minimum length
        match env::var("SESSION_SECRET") {
            Ok(secret) if secret.len() >= 32 => {}
            Ok(_) => {
                return Err(AppError::config(
                    "SESSION_SECRET is too short. It should be at least 32 characters for security.",
                ));
            }
            Err(_) => {
                return Err(AppError::config("SESSION_SECRET must be set."));
            }
        }

        for name in &[
            "STRIPE_SECRET_KEY",
            "STRIPE_WEBHOOK_SECRET",
            "STRIPE_PRICE_ID",
        ] {
            if env::var(name).map(|v| v.is_empty()).unwrap_or(true) {
                return Err(AppError::config(format!("{name} must be set.")));
            }
        }

        Ok(())
    }

    /// Whether the session cookie gets the `Secure` attribute.
    pub fn cookie_secure(&self) -> bool {
        self.runtime_env.is_prod()
    }

    /// A complete config for unit tests, independent of the environment.
    #[cfg(test)]
    pub(crate) fn test_default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            public_base_url: "https://tools.example.com".to_string(),
            runtime_env: RuntimeEnv::Dev,
            session_secret: "0123456789abcdef0123456789abcdef".to_string(),
            redis_url: None,
            data_dir: "data".into(),
            registry_path: "registry.json".into(),
            downloads_dir: "downloads".into(),
            stripe_secret_key: "sk_test_abc".to_string(),
            stripe_webhook_secret: "whsec_test".to_string(),
            stripe_price_id: "price_123".to_string(),
            resend_api_key: None,
            email_from: "Toolgate <noreply@toolgate.test>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn set_required_env() {
        env::set_var(
            "SESSION_SECRET",
            "0123456789abcdef0123456789abcdef-test",
        );
        env::set_var("STRIPE_SECRET_KEY", "sk_test_123");
        env::set_var("STRIPE_WEBHOOK_SECRET", "whsec_test_123");
        env::set_var("STRIPE_PRICE_ID", "price_test_123");
    }

    fn clear_env() {
        for name in [
            "SESSION_SECRET",
            "STRIPE_SECRET_KEY",
            "STRIPE_WEBHOOK_SECRET",
            "STRIPE_PRICE_ID",
            "REDIS_URL",
            "RUNTIME_ENV",
            "BACKEND_PORT",
            "PUBLIC_BASE_URL",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn from_env_happy_path_defaults() {
        clear_env();
        set_required_env();

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.public_base_url, "http://localhost:3000");
        assert_eq!(config.runtime_env, RuntimeEnv::Dev);
        assert!(config.redis_url.is_none());
        assert!(!config.cookie_secure());

        clear_env();
    }

    #[test]
    #[serial]
    fn from_env_rejects_short_secret() {
        clear_env();
        set_required_env();
        env::set_var("SESSION_SECRET", "short");

        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, AppError::Config { .. }));

        clear_env();
    }

    #[test]
    #[serial]
    fn from_env_requires_billing_keys() {
        clear_env();
        set_required_env();
        env::remove_var("STRIPE_WEBHOOK_SECRET");

        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, AppError::Config { .. }));

        clear_env();
    }

    #[test]
    #[serial]
    fn prod_env_enables_secure_cookies() {
        clear_env();
        set_required_env();
        env::set_var("RUNTIME_ENV", "prod");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.runtime_env, RuntimeEnv::Prod);
        assert!(config.cookie_secure());

        clear_env();
    }

    #[test]
    #[serial]
    fn trailing_slash_is_stripped_from_base_url() {
        clear_env();
        set_required_env();
        env::set_var("PUBLIC_BASE_URL", "https://tools.example.com/");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.public_base_url, "https://tools.example.com");

        clear_env();
    }
}
