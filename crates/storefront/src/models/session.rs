//! Session-related keys.

/// Session keys for checkout data.
pub mod keys {
    /// Key for the visitor's current [`CheckoutId`](goldtrust_core::CheckoutId).
    pub const CHECKOUT_ID: &str = "checkout_id";
}
