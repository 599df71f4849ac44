//! GoldTrust Core - Shared domain types.
//!
//! This crate provides the types shared by the storefront and its tests:
//! - phone normalization and contact details
//! - the fixed code price
//! - the pending transaction record appended on every confirm attempt
//! - the two-step checkout wizard state machine
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O,
//! no timers, no HTTP. The storefront owns scheduling and persistence and
//! drives the wizard from the outside.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for phones, prices, ids, and statuses
//! - [`wizard`] - Checkout wizard (Details -> Payment) and its countdown

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod wizard;

pub use types::*;
pub use wizard::{Countdown, Step, Wizard, WizardError};
