//! WhatsApp click-to-chat links.
//!
//! Links have the form `https://wa.me/<digits>` with an optional pre-filled
//! `text` parameter. Nothing is sent programmatically; the browser opens the
//! link in a new tab.

use thiserror::Error;
use url::Url;

const BASE_URL: &str = "https://wa.me/";

/// Errors building a [`WhatsAppLink`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WhatsAppLinkError {
    #[error("WhatsApp number must contain digits")]
    NoDigits,
    #[error("invalid WhatsApp URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// A click-to-chat link for one phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhatsAppLink {
    url: Url,
}

impl WhatsAppLink {
    /// Build a link from an international number such as `+2347040282039`.
    ///
    /// # Errors
    ///
    /// Returns [`WhatsAppLinkError::NoDigits`] if the number has no digits.
    pub fn new(number: &str) -> Result<Self, WhatsAppLinkError> {
        let digits: String = number.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(WhatsAppLinkError::NoDigits);
        }
        let url = Url::parse(BASE_URL)?.join(&digits)?;
        Ok(Self { url })
    }

    /// The bare chat link.
    #[must_use]
    pub fn url(&self) -> String {
        self.url.to_string()
    }

    /// The chat link with a pre-filled message, spaces encoded as `%20`.
    #[must_use]
    pub fn with_text(&self, text: &str) -> String {
        format!("{}?text={}", self.url, urlencoding::encode(text))
    }

    /// The digits the link points at.
    #[must_use]
    pub fn number(&self) -> &str {
        self.url.path().trim_start_matches('/')
    }
}
