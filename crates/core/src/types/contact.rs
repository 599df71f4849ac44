//! Contact details collected before checkout.

use serde::{Deserialize, Serialize};

use super::phone::{Phone, PhoneError};

/// Missing or unusable contact fields.
///
/// The messages are shown to the user as-is.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("Please enter your name to proceed")]
    MissingName,
    #[error("Please enter your phone number")]
    MissingPhone,
}

impl From<PhoneError> for ContactError {
    fn from(_: PhoneError) -> Self {
        Self::MissingPhone
    }
}

/// Name and normalized phone number of the buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub phone: Phone,
}

impl ContactInfo {
    /// Validate raw form input.
    ///
    /// The name is trimmed; the phone goes through [`Phone::parse`]. The name
    /// is checked first.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::MissingName`] for a blank name and
    /// [`ContactError::MissingPhone`] for a blank or digit-free phone.
    pub fn parse(name: &str, phone: &str) -> Result<Self, ContactError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ContactError::MissingName);
        }

        let phone = Phone::parse(phone)?;

        Ok(Self {
            name: name.to_owned(),
            phone,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let contact = ContactInfo::parse("  Ada Obi ", "+234 803 123 4567").unwrap();
        assert_eq!(contact.name, "Ada Obi");
        assert_eq!(contact.phone.as_str(), "08031234567");
    }

    #[test]
    fn test_parse_missing_name_checked_first() {
        assert_eq!(
            ContactInfo::parse("", ""),
            Err(ContactError::MissingName)
        );
        assert_eq!(
            ContactInfo::parse("   ", "08031234567"),
            Err(ContactError::MissingName)
        );
    }

    #[test]
    fn test_parse_missing_phone() {
        assert_eq!(
            ContactInfo::parse("Ada", ""),
            Err(ContactError::MissingPhone)
        );
        assert_eq!(
            ContactInfo::parse("Ada", "n/a"),
            Err(ContactError::MissingPhone)
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ContactError::MissingName.to_string(),
            "Please enter your name to proceed"
        );
        assert_eq!(
            ContactError::MissingPhone.to_string(),
            "Please enter your phone number"
        );
    }

    #[test]
    fn test_serialize_shape() {
        let contact = ContactInfo::parse("Ada", "08031234567").unwrap();
        let json = serde_json::to_value(&contact).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "name": "Ada", "phone": "08031234567" })
        );
    }
}
