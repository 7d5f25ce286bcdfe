//! External messaging deep links.
//!
//! # Responsibility
//! - Build templated message links from a phone number and text.
//!
//! # Invariants
//! - The core only constructs URLs; delivery and confirmation belong to
//!   whatever opens the link.
//! - Phone input is free-form; everything except digits is discarded.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use url::form_urlencoded::byte_serialize;

static NON_DIGIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9]+").expect("valid digit filter regex"));

/// Link-construction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagingError {
    /// The phone input contained no digits at all.
    NoDigitsInPhone(String),
}

impl Display for MessagingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDigitsInPhone(raw) => {
                write!(f, "phone input `{raw}` contains no digits")
            }
        }
    }
}

impl Error for MessagingError {}

/// Builds a `wa.me` deep link carrying pre-formatted text.
pub fn message_link(phone: &str, text: &str) -> Result<String, MessagingError> {
    let digits = NON_DIGIT_RE.replace_all(phone, "");
    if digits.is_empty() {
        return Err(MessagingError::NoDigitsInPhone(phone.to_string()));
    }
    let encoded: String = byte_serialize(text.as_bytes()).collect();
    Ok(format!("https://wa.me/{digits}?text={encoded}"))
}

#[cfg(test)]
mod tests {
    use super::{message_link, MessagingError};

    #[test]
    fn strips_formatting_from_phone_input() {
        let link = message_link("+351 912 345 678", "hello").unwrap();
        assert_eq!(link, "https://wa.me/351912345678?text=hello");
    }

    #[test]
    fn encodes_message_text() {
        let link = message_link("5511999887766", "Reading on 2025-03-03, main hall").unwrap();
        assert!(link.starts_with("https://wa.me/5511999887766?text="));
        assert!(!link.contains(' '));
        assert!(link.contains("2025-03-03"));
    }

    #[test]
    fn rejects_digitless_phone() {
        let err = message_link("ext. none", "hello").unwrap_err();
        assert!(matches!(err, MessagingError::NoDigitsInPhone(_)));
    }
}
