//! Checkout wizard state machine.
//!
//! Two steps: [`Step::Details`] collects the contact details, [`Step::Payment`]
//! shows the transfer instructions under a ten minute countdown. The wizard is
//! purely synchronous; callers own the clock and call [`Wizard::tick`] once per
//! second and [`Wizard::finish_confirm`] after [`CONFIRM_DELAY`].
//!
//! ```text
//!              proceed / auto-advance
//!   Details  ------------------------->  Payment  (countdown = 600)
//!            <-------------------------
//!                   edit_details
//!
//!   Payment: status None --begin_confirm--> Pending --finish_confirm--> Unsuccessful
//! ```
//!
//! Every failed operation leaves the wizard untouched.

use core::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ContactError, ContactInfo, PaymentStatus, PendingTransaction};

/// Length of the payment window.
pub const COUNTDOWN_SECONDS: u32 = 10 * 60;

/// Remaining time at or below which the countdown is shown as a warning.
pub const WARNING_THRESHOLD_SECONDS: u32 = 60;

/// Delay before a deep-linked visit moves on to the Payment step.
pub const AUTO_ADVANCE_DELAY: Duration = Duration::from_millis(220);

/// Simulated verification time for "Confirm Payment".
pub const CONFIRM_DELAY: Duration = Duration::from_millis(1200);

/// Simulated processing time before the selector navigates to checkout.
pub const PROCESSING_DELAY: Duration = Duration::from_millis(450);

/// Resolution of the countdown.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Details,
    Payment,
}

impl Step {
    /// One-based step number as shown to the user.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Details => 1,
            Self::Payment => 2,
        }
    }
}

/// Errors returned by wizard transitions.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error(transparent)]
    InvalidContact(#[from] ContactError),
    #[error("payment can only be confirmed on the payment step")]
    NotOnPaymentStep,
    #[error("⏳ Payment time expired! Restart process.")]
    CountdownExpired,
    #[error("a confirmation is already in progress")]
    ConfirmInFlight,
}

/// Seconds left in the payment window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    /// A full countdown.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            remaining: COUNTDOWN_SECONDS,
        }
    }

    /// Seconds remaining.
    #[must_use]
    pub const fn remaining(self) -> u32 {
        self.remaining
    }

    /// Restart from [`COUNTDOWN_SECONDS`].
    pub const fn reset(&mut self) {
        self.remaining = COUNTDOWN_SECONDS;
    }

    /// Remove one second, stopping at zero.
    pub const fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    #[must_use]
    pub const fn is_expired(self) -> bool {
        self.remaining == 0
    }

    #[must_use]
    pub const fn is_warning(self) -> bool {
        self.remaining <= WARNING_THRESHOLD_SECONDS
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Display for Countdown {
    /// Zero-padded `MM:SS`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

/// Raw, possibly invalid values typed into the Details form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
    pub name: String,
    pub phone: String,
}

/// The checkout wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Wizard {
    step: Step,
    draft: ContactDraft,
    contact: Option<ContactInfo>,
    countdown: Countdown,
    payment_status: Option<PaymentStatus>,
}

impl Wizard {
    /// A fresh wizard on the Details step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    /// Values to show in the Details form.
    #[must_use]
    pub const fn draft(&self) -> &ContactDraft {
        &self.draft
    }

    /// Validated contact details, set once the Details step has been passed.
    #[must_use]
    pub const fn contact(&self) -> Option<&ContactInfo> {
        self.contact.as_ref()
    }

    #[must_use]
    pub const fn countdown(&self) -> Countdown {
        self.countdown
    }

    #[must_use]
    pub const fn payment_status(&self) -> Option<PaymentStatus> {
        self.payment_status
    }

    /// Fill the Details form from inbound parameters.
    ///
    /// Valid values are stored normalized, anything else as given. Returns
    /// `true` when both values are valid, meaning the caller should
    /// auto-advance to the Payment step after [`AUTO_ADVANCE_DELAY`].
    pub fn prefill(&mut self, name: Option<&str>, phone: Option<&str>) -> bool {
        let name = name.unwrap_or_default();
        let phone = phone.unwrap_or_default();

        match ContactInfo::parse(name, phone) {
            Ok(contact) => {
                self.draft = ContactDraft {
                    name: contact.name.clone(),
                    phone: contact.phone.to_string(),
                };
                self.contact = Some(contact);
                true
            }
            Err(_) => {
                self.draft = ContactDraft {
                    name: name.to_owned(),
                    phone: phone.to_owned(),
                };
                false
            }
        }
    }

    /// Submit the Details form.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::InvalidContact`] when either field is missing;
    /// the wizard is left unchanged.
    pub fn proceed(&mut self, name: &str, phone: &str) -> Result<(), WizardError> {
        let contact = ContactInfo::parse(name, phone)?;
        self.draft = ContactDraft {
            name: contact.name.clone(),
            phone: contact.phone.to_string(),
        };
        self.contact = Some(contact);
        self.enter_payment();
        Ok(())
    }

    /// Move to the Payment step with a full countdown and no payment status.
    ///
    /// Ignored while no valid contact is known.
    pub fn enter_payment(&mut self) {
        if self.contact.is_none() {
            return;
        }
        self.step = Step::Payment;
        self.countdown.reset();
        self.payment_status = None;
    }

    /// Return to the Details step, discarding countdown and payment status.
    pub fn edit_details(&mut self) {
        self.step = Step::Details;
        self.countdown.reset();
        self.payment_status = None;
    }

    /// Advance the countdown by one second. No effect outside the Payment step.
    pub const fn tick(&mut self) -> Countdown {
        if matches!(self.step, Step::Payment) {
            self.countdown.tick();
        }
        self.countdown
    }

    /// Start a confirmation attempt.
    ///
    /// # Errors
    ///
    /// - [`WizardError::NotOnPaymentStep`] outside the Payment step
    /// - [`WizardError::CountdownExpired`] once the countdown reached zero
    /// - [`WizardError::ConfirmInFlight`] while an attempt is still pending
    pub fn begin_confirm(&mut self) -> Result<(), WizardError> {
        if self.step != Step::Payment {
            return Err(WizardError::NotOnPaymentStep);
        }
        if self.countdown.is_expired() {
            return Err(WizardError::CountdownExpired);
        }
        if self.payment_status == Some(PaymentStatus::Pending) {
            return Err(WizardError::ConfirmInFlight);
        }
        self.payment_status = Some(PaymentStatus::Pending);
        Ok(())
    }

    /// Resolve a pending attempt as unsuccessful.
    ///
    /// Returns the record to append, or `None` when no attempt is pending
    /// (for example because the user went back to the Details step).
    pub fn finish_confirm(&mut self, amount: u64, now: DateTime<Utc>) -> Option<PendingTransaction> {
        if self.step != Step::Payment || self.payment_status != Some(PaymentStatus::Pending) {
            return None;
        }
        let contact = self.contact.clone()?;
        self.payment_status = Some(PaymentStatus::Unsuccessful);
        Some(PendingTransaction::buy_code(amount, contact, now))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::TransactionStatus;

    fn on_payment() -> Wizard {
        let mut wizard = Wizard::new();
        wizard.proceed("Ada", "08031234567").unwrap();
        wizard
    }

    #[test]
    fn test_new_wizard() {
        let wizard = Wizard::new();
        assert_eq!(wizard.step(), Step::Details);
        assert_eq!(wizard.countdown().remaining(), COUNTDOWN_SECONDS);
        assert_eq!(wizard.payment_status(), None);
        assert!(wizard.contact().is_none());
    }

    #[test]
    fn test_proceed_requires_both_fields() {
        let mut wizard = Wizard::new();
        let before = wizard.clone();

        assert_eq!(
            wizard.proceed("", "08031234567"),
            Err(WizardError::InvalidContact(ContactError::MissingName))
        );
        assert_eq!(
            wizard.proceed("Ada", "  "),
            Err(WizardError::InvalidContact(ContactError::MissingPhone))
        );
        assert_eq!(wizard, before);
    }

    #[test]
    fn test_proceed_normalizes_phone() {
        let wizard = {
            let mut w = Wizard::new();
            w.proceed("Ada", "+234 803 123 4567").unwrap();
            w
        };
        assert_eq!(wizard.step(), Step::Payment);
        assert_eq!(wizard.contact().unwrap().phone.as_str(), "08031234567");
        assert_eq!(wizard.draft().phone, "08031234567");
    }

    #[test]
    fn test_prefill_both_values_requests_auto_advance() {
        let mut wizard = Wizard::new();
        assert!(wizard.prefill(Some("Ada"), Some("08031234567")));
        assert_eq!(wizard.step(), Step::Details);
        assert!(wizard.contact().is_some());

        wizard.enter_payment();
        assert_eq!(wizard.step(), Step::Payment);
    }

    #[test]
    fn test_prefill_partial_stays_on_details() {
        let mut wizard = Wizard::new();
        assert!(!wizard.prefill(Some("Ada"), None));
        assert_eq!(wizard.draft().name, "Ada");
        assert!(wizard.contact().is_none());

        wizard.enter_payment();
        assert_eq!(wizard.step(), Step::Details);
    }

    #[test]
    fn test_countdown_saturates_at_zero() {
        let mut wizard = on_payment();
        for _ in 0..COUNTDOWN_SECONDS {
            wizard.tick();
        }
        assert!(wizard.countdown().is_expired());
        wizard.tick();
        assert_eq!(wizard.countdown().remaining(), 0);
    }

    #[test]
    fn test_tick_ignored_on_details() {
        let mut wizard = Wizard::new();
        wizard.tick();
        assert_eq!(wizard.countdown().remaining(), COUNTDOWN_SECONDS);
    }

    #[test]
    fn test_countdown_display_and_warning() {
        let mut countdown = Countdown::full();
        assert_eq!(countdown.to_string(), "10:00");
        assert!(!countdown.is_warning());

        for _ in 0..(COUNTDOWN_SECONDS - 61) {
            countdown.tick();
        }
        assert_eq!(countdown.to_string(), "01:01");
        assert!(!countdown.is_warning());

        countdown.tick();
        assert_eq!(countdown.to_string(), "01:00");
        assert!(countdown.is_warning());

        for _ in 0..55 {
            countdown.tick();
        }
        assert_eq!(countdown.to_string(), "00:05");
    }

    #[test]
    fn test_confirm_sequence() {
        let mut wizard = on_payment();
        assert_eq!(wizard.payment_status(), None);

        wizard.begin_confirm().unwrap();
        assert_eq!(wizard.payment_status(), Some(PaymentStatus::Pending));

        let record = wizard.finish_confirm(5500, Utc::now()).unwrap();
        assert_eq!(wizard.payment_status(), Some(PaymentStatus::Unsuccessful));
        assert_eq!(record.amount, 5500);
        assert_eq!(record.status, TransactionStatus::Pending);
        assert_eq!(record.meta.name, "Ada");

        // A second attempt is allowed once the first resolved
        wizard.begin_confirm().unwrap();
        assert!(wizard.finish_confirm(5500, Utc::now()).is_some());
    }

    #[test]
    fn test_confirm_rejected_when_expired() {
        let mut wizard = on_payment();
        for _ in 0..COUNTDOWN_SECONDS {
            wizard.tick();
        }
        let before = wizard.clone();

        assert_eq!(wizard.begin_confirm(), Err(WizardError::CountdownExpired));
        assert_eq!(wizard, before);
        assert!(wizard.finish_confirm(5500, Utc::now()).is_none());
    }

    #[test]
    fn test_confirm_rejected_on_details() {
        let mut wizard = Wizard::new();
        assert_eq!(wizard.begin_confirm(), Err(WizardError::NotOnPaymentStep));
    }

    #[test]
    fn test_confirm_rejected_while_pending() {
        let mut wizard = on_payment();
        wizard.begin_confirm().unwrap();
        assert_eq!(wizard.begin_confirm(), Err(WizardError::ConfirmInFlight));
    }

    #[test]
    fn test_finish_without_begin_is_noop() {
        let mut wizard = on_payment();
        assert!(wizard.finish_confirm(5500, Utc::now()).is_none());
        assert_eq!(wizard.payment_status(), None);
    }

    #[test]
    fn test_edit_details_discards_payment_state() {
        let mut wizard = on_payment();
        wizard.tick();
        wizard.begin_confirm().unwrap();

        wizard.edit_details();
        assert_eq!(wizard.step(), Step::Details);
        assert_eq!(wizard.payment_status(), None);
        assert!(wizard.finish_confirm(5500, Utc::now()).is_none());

        // Draft survives so the form is pre-filled
        assert_eq!(wizard.draft().name, "Ada");
    }

    #[test]
    fn test_reentering_payment_resets_countdown() {
        let mut wizard = on_payment();
        for _ in 0..100 {
            wizard.tick();
        }
        wizard.edit_details();
        wizard.proceed("Ada", "08031234567").unwrap();
        assert_eq!(wizard.countdown().remaining(), COUNTDOWN_SECONDS);
    }

    #[test]
    fn test_step_numbers() {
        assert_eq!(Step::Details.number(), 1);
        assert_eq!(Step::Payment.number(), 2);
    }

    #[test]
    fn test_expired_message() {
        assert_eq!(
            WizardError::CountdownExpired.to_string(),
            "⏳ Payment time expired! Restart process."
        );
    }
}
