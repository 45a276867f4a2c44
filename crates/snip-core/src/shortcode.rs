use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Length of every generated short code.
pub const CODE_LENGTH: usize = 4;

/// The alphabet generated short codes are drawn from.
pub const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

const MAX_LENGTH: usize = 32;

/// A validated short code identifier for a shortened URL.
///
/// Generated codes are always [`CODE_LENGTH`] characters from [`ALPHABET`].
/// Codes arriving from clients are only checked for shape (1-32 characters of
/// `[a-zA-Z0-9_-]`) so that lookups of unknown codes report "not found"
/// instead of a validation failure.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortCode(String);

impl ShortCode {
    /// Creates a new `ShortCode` after validating the input.
    pub fn new(code: impl Into<String>) -> Result<Self, CoreError> {
        let code = code.into();
        Self::validate(&code)?;
        Ok(Self(code))
    }

    /// Creates a `ShortCode` without validation.
    ///
    /// Use this only for codes produced by trusted internal sources
    /// (generators, rows read back from storage).
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns `true` if the code has the shape of a generated code.
    pub fn is_generated_form(&self) -> bool {
        self.0.len() == CODE_LENGTH && self.0.bytes().all(|b| ALPHABET.contains(&b))
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(code: &str) -> Result<(), CoreError> {
        if code.is_empty() {
            return Err(CoreError::InvalidShortCode(
                "short code is required".to_string(),
            ));
        }

        if code.len() > MAX_LENGTH {
            return Err(CoreError::InvalidShortCode(format!(
                "length must be at most {}, got {}",
                MAX_LENGTH,
                code.len()
            )));
        }

        if !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(CoreError::InvalidShortCode(format!(
                "must contain only alphanumeric characters, hyphens, or underscores: '{}'",
                code
            )));
        }

        Ok(())
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ShortCode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShortCode> for String {
    fn from(value: ShortCode) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_codes() {
        assert!(ShortCode::new("aB3x").is_ok());
        assert!(ShortCode::new("doesnotexist").is_ok());
        assert!(ShortCode::new("Abc-123_xyz").is_ok());
        assert!(ShortCode::new("a".repeat(32)).is_ok());
    }

    #[test]
    fn empty_is_rejected() {
        let err = ShortCode::new("").unwrap_err();
        assert_eq!(err.to_string(), "invalid short code: short code is required");
    }

    #[test]
    fn too_long() {
        assert!(ShortCode::new("a".repeat(33)).is_err());
    }

    #[test]
    fn invalid_characters() {
        assert!(ShortCode::new("abc def").is_err());
        assert!(ShortCode::new("abc/def").is_err());
        assert!(ShortCode::new("abc!def").is_err());
    }

    #[test]
    fn generated_form() {
        assert!(ShortCode::new_unchecked("aB3x").is_generated_form());
        assert!(!ShortCode::new_unchecked("aB3").is_generated_form());
        assert!(!ShortCode::new_unchecked("aB3xy").is_generated_form());
        assert!(!ShortCode::new_unchecked("aB-x").is_generated_form());
    }

    #[test]
    fn alphabet_is_62_distinct_alphanumerics() {
        let mut seen = std::collections::HashSet::new();
        for b in ALPHABET {
            assert!(b.is_ascii_alphanumeric());
            assert!(seen.insert(*b));
        }
        assert_eq!(seen.len(), 62);
    }

    #[test]
    fn to_url() {
        let code = ShortCode::new("abc1").unwrap();
        assert_eq!(code.to_url("http://host/api"), "http://host/api/abc1");
        assert_eq!(code.to_url("http://host/api/"), "http://host/api/abc1");
    }

    #[test]
    fn deserialize_validates() {
        let code: ShortCode = serde_json::from_str("\"aB3x\"").unwrap();
        assert_eq!(code.as_str(), "aB3x");
        assert!(serde_json::from_str::<ShortCode>("\"a b\"").is_err());
    }
}
