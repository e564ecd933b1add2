//! User name validation
//!
//! Display names keep their casing; uniqueness is enforced on the
//! lower-cased shadow column maintained by the storage layer.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Maximum length for user names
const MAX_USER_NAME_LEN: usize = 20;

/// Alphanumeric start, then alphanumerics, hyphens, underscores
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{0,19}$").expect("invalid name regex"));

/// Validated user name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserName(String);

impl UserName {
    /// Create a user name, validating length and character set.
    ///
    /// # Rules
    /// - Max 20 characters
    /// - Alphanumerics, hyphens, underscores
    /// - Must start with an alphanumeric
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "user name" });
        }

        if s.len() > MAX_USER_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "user name",
                max: MAX_USER_NAME_LEN,
            });
        }

        if !NAME_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "user name",
                reason: "must be alphanumeric with hyphens/underscores, starting with alphanumeric",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased form used for the uniqueness shadow column.
    pub fn lower(&self) -> String {
        self.0.to_lowercase()
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
