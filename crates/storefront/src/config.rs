//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! Every variable is optional; defaults reproduce the live storefront.
//!
//! ## Server
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: <http://localhost:3000>);
//!   an `https://` URL turns on secure cookies
//! - `STOREFRONT_RATE_LIMIT` - Rate limit form posts (default: true)
//!
//! ## Checkout
//! - `STOREFRONT_CODE_PRICE` - Price in naira (default: 5500)
//! - `STOREFRONT_SUPPORT_WHATSAPP` - Support contact (default: +2348136347797)
//! - `STOREFRONT_VENDOR_WHATSAPP` - Vendor contact for receipts (default: +2347040282039)
//! - `STOREFRONT_BANK_ACCOUNT_NAME` - Transfer account name
//! - `STOREFRONT_BANK_ACCOUNT_NUMBER` - Transfer account number
//! - `STOREFRONT_BANK_NAME` - Transfer bank
//! - `STOREFRONT_TRANSACTION_LOG` - JSON Lines file for pending transactions
//!   (default: data/transactions.jsonl); `memory` keeps them in process
//!
//! ## Observability
//! - `LOG_FORMAT` - `json` for JSON logs, anything else for plain text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use goldtrust_core::Price;
use thiserror::Error;

use crate::services::WhatsAppLink;

const DEFAULT_CODE_PRICE: &str = "5500";
const DEFAULT_SUPPORT_WHATSAPP: &str = "+2348136347797";
const DEFAULT_VENDOR_WHATSAPP: &str = "+2347040282039";
const DEFAULT_BANK_ACCOUNT_NAME: &str = "Muhammad Danwase Rilwan";
const DEFAULT_BANK_ACCOUNT_NUMBER: &str = "2084470850";
const DEFAULT_BANK_NAME: &str = "Kuda Bank";
const DEFAULT_TRANSACTION_LOG: &str = "data/transactions.jsonl";

/// Value of `STOREFRONT_TRANSACTION_LOG` selecting the in-memory log.
const MEMORY_LOG: &str = "memory";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Price of one code
    pub price: Price,
    /// Vendor contact and transfer details
    pub vendor: VendorConfig,
    /// Where pending transactions are written
    pub transaction_log: TransactionLogTarget,
    /// Whether form posts are rate limited
    pub rate_limit: bool,
    /// Emit JSON logs instead of plain text
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error event sample rate
    pub sentry_sample_rate: f32,
    /// Sentry performance trace sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Vendor contact links and bank transfer details.
#[derive(Debug, Clone)]
pub struct VendorConfig {
    /// Shown on the purchase page ("Contact", "Contact support")
    pub support_whatsapp: WhatsAppLink,
    /// Shown on the checkout page ("How to Pay", "Send Receipt")
    pub vendor_whatsapp: WhatsAppLink,
    pub bank: BankAccount,
}

/// Account the buyer transfers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankAccount {
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
}

/// Destination of the pending transaction log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionLogTarget {
    /// Append JSON Lines to this file.
    File(PathBuf),
    /// Keep records in memory.
    Memory,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env.parse_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = env.parse_or_default::<u16>("STOREFRONT_PORT", "3000")?;
        let base_url = env.or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        let price = parse_price(&env.or_default("STOREFRONT_CODE_PRICE", DEFAULT_CODE_PRICE))
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_CODE_PRICE".to_string(), e))?;

        let vendor = VendorConfig {
            support_whatsapp: env.whatsapp("STOREFRONT_SUPPORT_WHATSAPP", DEFAULT_SUPPORT_WHATSAPP)?,
            vendor_whatsapp: env.whatsapp("STOREFRONT_VENDOR_WHATSAPP", DEFAULT_VENDOR_WHATSAPP)?,
            bank: BankAccount {
                account_name: env
                    .or_default("STOREFRONT_BANK_ACCOUNT_NAME", DEFAULT_BANK_ACCOUNT_NAME),
                account_number: env
                    .or_default("STOREFRONT_BANK_ACCOUNT_NUMBER", DEFAULT_BANK_ACCOUNT_NUMBER),
                bank_name: env.or_default("STOREFRONT_BANK_NAME", DEFAULT_BANK_NAME),
            },
        };

        let transaction_log = parse_log_target(
            &env.or_default("STOREFRONT_TRANSACTION_LOG", DEFAULT_TRANSACTION_LOG),
        );
        let rate_limit = env.parse_or_default::<bool>("STOREFRONT_RATE_LIMIT", "true")?;
        let json_logs = env
            .optional("LOG_FORMAT")
            .is_some_and(|v| v.eq_ignore_ascii_case("json"));

        let sentry_dsn = env.optional("SENTRY_DSN");
        let sentry_environment = env.optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env.sample_rate("SENTRY_SAMPLE_RATE", "1.0")?;
        let sentry_traces_sample_rate = env.sample_rate("SENTRY_TRACES_SAMPLE_RATE", "0.0")?;

        Ok(Self {
            host,
            port,
            base_url,
            price,
            vendor,
            transaction_log,
            rate_limit,
            json_logs,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with typed accessors.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable with a default value.
    fn parse_or_default<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Parse a WhatsApp contact number.
    fn whatsapp(&self, key: &str, default: &str) -> Result<WhatsAppLink, ConfigError> {
        WhatsAppLink::new(&self.or_default(key, default))
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Parse a Sentry sample rate in `0.0..=1.0`.
    fn sample_rate(&self, key: &str, default: &str) -> Result<f32, ConfigError> {
        let rate = self.parse_or_default::<f32>(key, default)?;
        if (0.0..=1.0).contains(&rate) {
            Ok(rate)
        } else {
            Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("must be between 0.0 and 1.0 (got {rate})"),
            ))
        }
    }
}

/// Parse a positive whole-naira price.
fn parse_price(value: &str) -> Result<Price, String> {
    let amount = value.trim().parse::<u64>().map_err(|e| e.to_string())?;
    if amount == 0 {
        return Err("must be greater than zero".to_string());
    }
    Ok(Price::naira(amount))
}

/// Interpret the transaction log setting.
fn parse_log_target(value: &str) -> TransactionLogTarget {
    let value = value.trim();
    if value.eq_ignore_ascii_case(MEMORY_LOG) {
        TransactionLogTarget::Memory
    } else {
        TransactionLogTarget::File(PathBuf::from(value))
    }
}
