//! Core domain types shared across the platform

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique call identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId(pub String);

impl CallId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A dialable phone number as entered on the dial pad.
///
/// Only digits, `*`, `#` and `+` survive construction; everything else
/// is stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(number: impl Into<String>) -> Self {
        Self(Self::sanitize(&number.into()))
    }

    /// Strip every character that is not a digit, `*`, `#` or `+`.
    pub fn sanitize(input: &str) -> String {
        input
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '*' | '#' | '+'))
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number in the form the calls API expects: `+` prefixed unless
    /// the caller already typed one.
    pub fn dialable(&self) -> String {
        if self.0.starts_with('+') {
            self.0.clone()
        } else {
            format!("+{}", self.0)
        }
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
