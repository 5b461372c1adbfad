//! Contact details auto-filled into the booking form.

use crate::result::{ShowreelError, ShowreelResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A field of the contact form, in fill order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    /// Full name
    Name,
    /// Company name
    Company,
    /// Email address
    Email,
    /// Phone number
    Phone,
    /// Free-text message
    Message,
}

impl ContactField {
    /// All fields in the order the form is filled
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::Company,
        Self::Email,
        Self::Phone,
        Self::Message,
    ];

    /// Placeholder text shown in the empty field
    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::Name => "Ditt namn",
            Self::Company => "Företagsnamn",
            Self::Email => "din@epost.se",
            Self::Phone => "+46",
            Self::Message => "Meddelande",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Name => "name",
            Self::Company => "company",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Message => "message",
        };
        write!(f, "{name}")
    }
}

/// Values typed into the contact form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    /// Full name
    pub name: String,
    /// Company name
    pub company: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
    /// Free-text message
    pub message: String,
}

impl Default for ContactDetails {
    fn default() -> Self {
        Self {
            name: "Erik Andersson".to_string(),
            company: "TechSoft AB".to_string(),
            email: "erik@techsoft.se".to_string(),
            phone: "+46 70 123 45 67".to_string(),
            message: "Vi är intresserade av att implementera AI-chatbots för vår kundservice."
                .to_string(),
        }
    }
}

impl ContactDetails {
    /// Value for a given field
    #[must_use]
    pub fn value(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Company => &self.company,
            ContactField::Email => &self.email,
            ContactField::Phone => &self.phone,
            ContactField::Message => &self.message,
        }
    }

    /// Set a field value
    pub fn set(&mut self, field: ContactField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ContactField::Name => self.name = value,
            ContactField::Company => self.company = value,
            ContactField::Email => self.email = value,
            ContactField::Phone => self.phone = value,
            ContactField::Message => self.message = value,
        }
    }

    /// Empty form
    #[must_use]
    pub fn blank() -> Self {
        Self {
            name: String::new(),
            company: String::new(),
            email: String::new(),
            phone: String::new(),
            message: String::new(),
        }
    }

    /// A form is submittable when the name is set and the email looks valid
    pub fn validate(&self) -> ShowreelResult<()> {
        if self.name.trim().is_empty() {
            return Err(ShowreelError::invalid_contact("name is required"));
        }
        if !is_valid_email(self.email.trim()) {
            return Err(ShowreelError::invalid_contact(format!(
                "email '{}' is not valid",
                self.email
            )));
        }
        Ok(())
    }
}

/// Trivial email shape check: `local@domain.tld`, no whitespace
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
        .is_match(email)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_persona_is_valid() {
        let details = ContactDetails::default();
        details.validate().unwrap();
        assert_eq!(details.value(ContactField::Company), "TechSoft AB");
    }

    #[test]
    fn test_blank_form_rejected() {
        let err = ContactDetails::blank().validate().unwrap_err();
        assert!(err.to_string().contains("name is required"));
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut details = ContactDetails::default();
        details.set(ContactField::Email, "erik.techsoft.se");
        let err = details.validate().unwrap_err();
        assert!(err.to_string().contains("erik.techsoft.se"));
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("a@b.se"));
        assert!(is_valid_email("maria@digitalsolutions.se"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.se"));
        assert!(!is_valid_email("@c.se"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_fill_order_and_placeholders() {
        assert_eq!(ContactField::ALL[0], ContactField::Name);
        assert_eq!(ContactField::Email.placeholder(), "din@epost.se");
        assert_eq!(ContactField::Phone.to_string(), "phone");
    }

    proptest! {
        #[test]
        fn prop_simple_addresses_validate(
            local in "[a-z][a-z0-9]{0,10}",
            domain in "[a-z]{1,10}",
            tld in "[a-z]{2,4}",
        ) {
            let email = format!("{local}@{domain}.{tld}");
            prop_assert!(is_valid_email(&email));
        }

        #[test]
        fn prop_whitespace_never_validates(prefix in "[a-z]{1,5}", suffix in "[a-z]{1,5}") {
            let email = format!("{prefix} {suffix}@x.se");
            prop_assert!(!is_valid_email(&email));
        }
    }
}
