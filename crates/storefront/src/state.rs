//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::{StorefrontConfig, TransactionLogTarget};
use crate::services::{
    CheckoutRegistry, CheckoutSettings, JsonlTransactionLog, MemoryTransactionLog, TransactionLog,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// configuration and the live checkout sessions.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    checkouts: CheckoutRegistry,
}

impl AppState {
    /// Create application state, opening the configured transaction log.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let log: Arc<dyn TransactionLog> = match &config.transaction_log {
            TransactionLogTarget::File(path) => Arc::new(JsonlTransactionLog::new(path)),
            TransactionLogTarget::Memory => Arc::new(MemoryTransactionLog::new()),
        };
        Self::with_log(config, log)
    }

    /// Create application state writing to the given transaction log.
    #[must_use]
    pub fn with_log(config: StorefrontConfig, log: Arc<dyn TransactionLog>) -> Self {
        Self::with_settings(config, log, |settings| settings)
    }

    /// Create application state with adjusted checkout timings.
    #[must_use]
    pub fn with_settings(
        config: StorefrontConfig,
        log: Arc<dyn TransactionLog>,
        adjust: impl FnOnce(CheckoutSettings) -> CheckoutSettings,
    ) -> Self {
        let settings = adjust(CheckoutSettings::with_price(config.price));
        let checkouts = CheckoutRegistry::new(log, settings);

        Self {
            inner: Arc::new(AppStateInner { config, checkouts }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the live checkout sessions.
    #[must_use]
    pub fn checkouts(&self) -> &CheckoutRegistry {
        &self.inner.checkouts
    }
}
