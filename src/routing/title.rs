//! Page title validation
//!
//! A title doubles as the file stem on disk, so it is restricted to
//! ASCII letters and digits.

use std::fmt;

use crate::error::WikiError;

/// Validated page title: one or more of `[a-zA-Z0-9]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Title(String);

impl Title {
    pub fn parse(raw: &str) -> Result<Self, WikiError> {
        if is_valid_title(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(WikiError::InvalidTitle(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub fn is_valid_title(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_alphanumeric())
}
