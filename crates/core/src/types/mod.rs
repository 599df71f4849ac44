//! Core types for GoldTrust.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod id;
pub mod phone;
pub mod price;
pub mod status;
pub mod transaction;

pub use contact::{ContactError, ContactInfo};
pub use id::*;
pub use phone::{Phone, PhoneError, normalize_phone};
pub use price::{CurrencyCode, Price};
pub use status::*;
pub use transaction::{PendingTransaction, TransactionKind};
