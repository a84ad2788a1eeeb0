//! Sync service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SYNC_DATABASE_URL` - `PostgreSQL` connection string
//! - `SHOPIFY_DOMAIN` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_ACCESS_TOKEN` - Admin API access token (catalog listing)
//! - `SHOPIFY_STOREFRONT_TOKEN` - Storefront API access token (checkout)
//! - `SHOPIFY_WEBHOOK_SECRET` - Shared secret for webhook signature checks
//!
//! ## Optional
//! - `SYNC_HOST` - Bind address (default: 127.0.0.1)
//! - `SYNC_PORT` - Listen port (default: 3002)
//! - `SHOPIFY_API_VERSION` - API version (default: 2024-01)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Sync service configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shopify API configuration
    pub shopify: ShopifySyncConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Shopify API configuration for the sync subsystem.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ShopifySyncConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub domain: String,
    /// Shopify API version (e.g., 2024-01)
    pub api_version: String,
    /// Admin API access token (server-side only)
    pub access_token: SecretString,
    /// Storefront API access token used for checkout creation
    pub storefront_token: SecretString,
    /// Shared secret Shopify signs webhook deliveries with
    pub webhook_secret: SecretString,
}

impl std::fmt::Debug for ShopifySyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifySyncConfig")
            .field("domain", &self.domain)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .field("storefront_token", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .finish()
    }
}

impl SyncConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SYNC_DATABASE_URL")?;
        let host = get_env_or_default("SYNC_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SYNC_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SYNC_PORT", "3002")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SYNC_PORT".to_string(), e.to_string()))?;

        let shopify = ShopifySyncConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            shopify,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShopifySyncConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            domain: validate_store_domain(get_required_env("SHOPIFY_DOMAIN")?)?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", "2024-01"),
            access_token: get_validated_secret("SHOPIFY_ACCESS_TOKEN")?,
            storefront_token: get_required_secret("SHOPIFY_STOREFRONT_TOKEN")?,
            webhook_secret: get_validated_secret("SHOPIFY_WEBHOOK_SECRET")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    // Try primary key first (e.g., SYNC_DATABASE_URL)
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    // Fallback to generic DATABASE_URL (set by Fly.io postgres attach)
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that the store domain is a bare hostname.
///
/// Catches the common misconfiguration of pasting a full URL
/// (`https://store.myshopify.com/`) into `SHOPIFY_DOMAIN`, which would
/// produce garbage request URLs at sync time.
fn validate_store_domain(domain: String) -> Result<String, ConfigError> {
    let url = url::Url::parse(&format!("https://{domain}"))
        .map_err(|e| ConfigError::InvalidEnvVar("SHOPIFY_DOMAIN".to_string(), e.to_string()))?;

    if url.host_str() != Some(domain.as_str()) || url.path() != "/" {
        return Err(ConfigError::InvalidEnvVar(
            "SHOPIFY_DOMAIN".to_string(),
            "must be a bare domain like your-store.myshopify.com".to_string(),
        ));
    }

    Ok(domain)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    let lower = value.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let secret = get_required_secret(key)?;
    validate_secret_strength(&secret, key)?;
    Ok(secret)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let secret = SecretString::from("your-api-key-here");
        let result = validate_secret_strength(&secret, "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_changeme() {
        let secret = SecretString::from("changeme123");
        let result = validate_secret_strength(&secret, "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let secret = SecretString::from("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let result = validate_secret_strength(&secret, "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let secret = SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6");
        let result = validate_secret_strength(&secret, "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_store_domain_bare_host() {
        let result = validate_store_domain("sugar-pine.myshopify.com".to_string());
        assert_eq!(result.unwrap(), "sugar-pine.myshopify.com");
    }

    #[test]
    fn test_validate_store_domain_rejects_scheme() {
        let result = validate_store_domain("https://sugar-pine.myshopify.com".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_store_domain_rejects_path() {
        let result = validate_store_domain("sugar-pine.myshopify.com/admin".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = SyncConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3002,
            shopify: ShopifySyncConfig {
                domain: "test.myshopify.com".to_string(),
                api_version: "2024-01".to_string(),
                access_token: SecretString::from("admin_token"),
                storefront_token: SecretString::from("storefront_token"),
                webhook_secret: SecretString::from("webhook_key"),
            },
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3002);
    }

    #[test]
    fn test_shopify_config_debug_redacts_secrets() {
        let config = ShopifySyncConfig {
            domain: "test.myshopify.com".to_string(),
            api_version: "2024-01".to_string(),
            access_token: SecretString::from("super_secret_admin_token"),
            storefront_token: SecretString::from("super_secret_storefront_token"),
            webhook_secret: SecretString::from("super_secret_webhook_key"),
        };

        let debug_output = format!("{config:?}");

        // Public fields should be visible
        assert!(debug_output.contains("test.myshopify.com"));
        assert!(debug_output.contains("2024-01"));

        // Secret fields should be redacted
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_admin_token"));
        assert!(!debug_output.contains("super_secret_storefront_token"));
        assert!(!debug_output.contains("super_secret_webhook_key"));
    }
}
