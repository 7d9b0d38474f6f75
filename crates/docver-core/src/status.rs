//! Status codes returned by the ECM service.
//!
//! The service reports outcomes as decimal strings inside the response body.
//! Some endpoints emit them as JSON numbers instead, so decoding accepts both
//! and keeps the decimal text. Comparisons are always by exact value.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Operation succeeded.
pub const SUCCESS: &str = "0";
/// Checkout refused because the document is already checked out.
pub const ALREADY_CHECKED_OUT: &str = "-50146";
/// Checkout refused because the document is locked (positive variant).
pub const CHECKED_OUT_LOCKED: &str = "50011";
/// Add-annotation refused because a group with that name already exists.
pub const DUPLICATE_ANNOTATION_GROUP: &str = "-50090";

/// A status value as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Default)]
pub struct StatusCode(String);

impl StatusCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn success() -> Self {
        Self::new(SUCCESS)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_success(&self) -> bool {
        self.0 == SUCCESS
    }

    /// Either of the two "already checked out" codes.
    pub fn is_checkout_conflict(&self) -> bool {
        self.0 == ALREADY_CHECKED_OUT || self.0 == CHECKED_OUT_LOCKED
    }

    pub fn is_duplicate_group(&self) -> bool {
        self.0 == DUPLICATE_ANNOTATION_GROUP
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "<missing>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<&str> for StatusCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Self(LenientString::deserialize(deserializer)?.into_string()))
    }
}

/// A JSON scalar that should be treated as text.
///
/// Identifiers such as session ids, page numbers and version numbers arrive
/// either quoted or as bare numbers depending on the endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LenientString {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl LenientString {
    pub fn into_string(self) -> String {
        match self {
            LenientString::Text(text) => text,
            LenientString::Number(number) => number.to_string(),
            LenientString::Flag(flag) => flag.to_string(),
        }
    }
}

/// `deserialize_with` helper for optional lenient text fields.
pub fn deserialize_optional_lenient<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LenientString>::deserialize(deserializer)?.map(LenientString::into_string))
}
