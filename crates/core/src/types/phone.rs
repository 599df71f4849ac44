//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// International prefix rewritten to [`LOCAL_PREFIX`] during normalization.
pub const COUNTRY_PREFIX: &str = "+234";

/// Local trunk prefix that replaces [`COUNTRY_PREFIX`].
pub const LOCAL_PREFIX: &str = "0";

/// Maximum number of digits kept after normalization.
pub const MAX_DIGITS: usize = 11;

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty or whitespace only.
    #[error("phone number cannot be empty")]
    Empty,
    /// Normalization removed every character.
    #[error("phone number must contain digits")]
    NoDigits,
}

/// Collapse user input into a local-format numeral string.
///
/// Whitespace is removed, a leading `+234` becomes `0`, every non-digit is
/// dropped and the result is cut to [`MAX_DIGITS`] digits.
///
/// ```
/// use goldtrust_core::normalize_phone;
///
/// assert_eq!(normalize_phone("+2348031234567"), "08031234567");
/// assert_eq!(normalize_phone("0803 123 4567"), "08031234567");
/// ```
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    let local = match compact.strip_prefix(COUNTRY_PREFIX) {
        Some(rest) => format!("{LOCAL_PREFIX}{rest}"),
        None => compact,
    };

    local
        .chars()
        .filter(char::is_ascii_digit)
        .take(MAX_DIGITS)
        .collect()
}

/// A normalized phone number.
///
/// ## Constraints
///
/// - ASCII digits only
/// - 1-11 characters
/// - International `+234` prefix already rewritten to `0`
///
/// ## Examples
///
/// ```
/// use goldtrust_core::Phone;
///
/// let phone = Phone::parse("+234 803 123 4567").unwrap();
/// assert_eq!(phone.as_str(), "08031234567");
///
/// assert!(Phone::parse("   ").is_err()); // blank
/// assert!(Phone::parse("call me").is_err()); // no digits
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse and normalize a `Phone` from user input.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneError::Empty`] for blank input and
    /// [`PhoneError::NoDigits`] when normalization leaves nothing behind.
    pub fn parse(raw: &str) -> Result<Self, PhoneError> {
        if raw.trim().is_empty() {
            return Err(PhoneError::Empty);
        }

        let normalized = normalize_phone(raw);
        if normalized.is_empty() {
            return Err(PhoneError::NoDigits);
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
