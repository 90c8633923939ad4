use thiserror::Error;

use crate::{Tainted, Verified};

/// Why a tainted value was rejected.
///
/// Never includes the rejected input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("sanitization failed ({kind}): {message}")]
pub struct SanitizationError {
    kind: SanitizationErrorKind,
    message: String,
}

impl SanitizationError {
    /// Creates a sanitization error.
    pub fn new(kind: SanitizationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The error kind.
    pub fn kind(&self) -> SanitizationErrorKind {
        self.kind
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Category of a [`SanitizationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SanitizationErrorKind {
    /// Empty or whitespace only.
    #[error("empty input")]
    Empty,
    /// Longer than the configured maximum.
    #[error("input too long")]
    TooLong,
    /// Contains control or non-printable characters.
    #[error("contains control characters")]
    ContainsControlChars,
    /// Contains a character outside the allowed set.
    #[error("invalid character")]
    InvalidCharacter,
}

/// Promotes [`Tainted`] values to [`Verified`] ones.
///
/// Implementations must validate before calling `Verified::new_unchecked`
/// and must not echo the rejected input in errors.
pub trait Sanitizer<T> {
    /// Validates `input`.
    ///
    /// # Errors
    ///
    /// [`SanitizationError`] if the input breaks a rule.
    fn sanitize(&self, input: Tainted<T>) -> Result<Verified<T>, SanitizationError>;
}

fn trimmed_non_empty(raw: &str, max_len: usize) -> Result<&str, SanitizationError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(SanitizationError::new(
            SanitizationErrorKind::Empty,
            "input is empty or contains only whitespace",
        ));
    }

    if trimmed.chars().any(char::is_control) {
        return Err(SanitizationError::new(
            SanitizationErrorKind::ContainsControlChars,
            "input contains control or non-printable characters",
        ));
    }

    if trimmed.len() > max_len {
        return Err(SanitizationError::new(
            SanitizationErrorKind::TooLong,
            format!("input exceeds maximum length of {}", max_len),
        ));
    }

    Ok(trimmed)
}

/// Free-text sanitizer: trims, rejects empty input, control characters and
/// anything longer than `max_len` bytes.
///
/// # Examples
///
/// ```
/// use credential_broker::{Sanitizer, StringSanitizer, Tainted};
///
/// let sanitizer = StringSanitizer::new(256);
/// let verified = sanitizer.sanitize(Tainted::new("  hello world  ".to_string())).unwrap();
/// assert_eq!(verified.as_ref(), "hello world");
///
/// assert!(sanitizer.sanitize(Tainted::new("hello\nworld".to_string())).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StringSanitizer {
    max_len: usize,
}

impl StringSanitizer {
    /// Sanitizer with the given maximum length. A zero limit is raised to 1.
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len: max_len.max(1),
        }
    }
}

impl Sanitizer<String> for StringSanitizer {
    fn sanitize(&self, input: Tainted<String>) -> Result<Verified<String>, SanitizationError> {
        let raw = input.into_inner();
        let trimmed = trimmed_non_empty(&raw, self.max_len)?;
        Ok(Verified::new_unchecked(trimmed.to_string()))
    }
}

/// Identifier sanitizer for tenant, user, provider and token-ref values.
///
/// On top of the [`StringSanitizer`] rules, only ASCII letters, digits and
/// `. _ : @ -` are accepted.
///
/// # Examples
///
/// ```
/// use credential_broker::{IdentifierSanitizer, Sanitizer, Tainted};
///
/// let sanitizer = IdentifierSanitizer::new(128);
/// assert!(sanitizer.sanitize(Tainted::new("tenant-1".to_string())).is_ok());
/// assert!(sanitizer.sanitize(Tainted::new("tenant 1".to_string())).is_err());
/// assert!(sanitizer.sanitize(Tainted::new("../etc".to_string())).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct IdentifierSanitizer {
    max_len: usize,
}

impl IdentifierSanitizer {
    /// Sanitizer with the given maximum length. A zero limit is raised to 1.
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len: max_len.max(1),
        }
    }

    fn is_allowed(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ':' | '@' | '-')
    }
}

impl Sanitizer<String> for IdentifierSanitizer {
    fn sanitize(&self, input: Tainted<String>) -> Result<Verified<String>, SanitizationError> {
        let raw = input.into_inner();
        let trimmed = trimmed_non_empty(&raw, self.max_len)?;

        if !trimmed.chars().all(Self::is_allowed) {
            return Err(SanitizationError::new(
                SanitizationErrorKind::InvalidCharacter,
                "identifiers may only contain letters, digits and . _ : @ -",
            ));
        }
        if trimmed.contains("..") {
            return Err(SanitizationError::new(
                SanitizationErrorKind::InvalidCharacter,
                "identifiers may not contain '..'",
            ));
        }

        Ok(Verified::new_unchecked(trimmed.to_string()))
    }
}
