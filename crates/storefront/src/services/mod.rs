//! Business logic services for storefront.
//!
//! # Services
//!
//! - `checkout` - Checkout sessions: wizard state plus countdown/confirm timers
//! - `scheduler` - Scheduled tasks that are aborted when dropped
//! - `transaction_log` - Append-only sink for pending transaction records
//! - `whatsapp` - Click-to-chat links for vendor and support contacts

pub mod checkout;
pub mod scheduler;
pub mod transaction_log;
pub mod whatsapp;

pub use checkout::{CheckoutRegistry, CheckoutSession, CheckoutSettings, CheckoutSnapshot};
pub use scheduler::ScheduledTask;
pub use transaction_log::{
    JsonlTransactionLog, MemoryTransactionLog, TransactionLog, TransactionLogError,
};
pub use whatsapp::{WhatsAppLink, WhatsAppLinkError};
