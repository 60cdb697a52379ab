//! Validation Traits
//!
//! Field-level checks shared by request types. Unlike a fail-fast check,
//! every violation is collected so the caller sees all of them at once.

use crate::error::{ApiError, ApiResult};

/// Accumulates field violation messages.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Violations {
    messages: Vec<String>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// `Ok(())` when nothing was recorded, otherwise a ValidationFailed error
    /// listing every message.
    pub fn into_result(self) -> ApiResult<()> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_failed(self.messages))
        }
    }
}

/// Trait for request types that check their own fields.
///
/// Implemented by request bodies so the `ValidatedJson` extractor can reject
/// them before a handler runs.
pub trait Validate {
    fn validate(&self) -> ApiResult<()>;
}

/// Trait for validating required, non-blank strings.
///
/// # Example
/// ```ignore
/// let mut violations = Violations::new();
/// draft.name.check_not_blank("Agent name", &mut violations);
/// violations.into_result()?;
/// ```
pub trait ValidateNotBlank {
    /// Record a violation if the value is missing, empty or whitespace-only.
    fn check_not_blank(&self, label: &str, violations: &mut Violations);
}

impl ValidateNotBlank for str {
    fn check_not_blank(&self, label: &str, violations: &mut Violations) {
        if self.trim().is_empty() {
            violations.push(format!("{} must not be blank", label));
        }
    }
}

impl ValidateNotBlank for String {
    fn check_not_blank(&self, label: &str, violations: &mut Violations) {
        self.as_str().check_not_blank(label, violations)
    }
}

impl<T: ValidateNotBlank> ValidateNotBlank for Option<T> {
    fn check_not_blank(&self, label: &str, violations: &mut Violations) {
        match self {
            Some(value) => value.check_not_blank(label, violations),
            None => violations.push(format!("{} must not be blank", label)),
        }
    }
}

/// Trait for validating maximum string length, counted in characters.
pub trait ValidateMaxChars {
    /// Record a violation if the value is longer than `max` characters.
    /// Absent values always pass.
    fn check_max_chars(&self, label: &str, max: usize, violations: &mut Violations);
}

impl ValidateMaxChars for str {
    fn check_max_chars(&self, label: &str, max: usize, violations: &mut Violations) {
        if self.chars().count() > max {
            violations.push(format!("{} must not exceed {} characters", label, max));
        }
    }
}

impl ValidateMaxChars for String {
    fn check_max_chars(&self, label: &str, max: usize, violations: &mut Violations) {
        self.as_str().check_max_chars(label, max, violations)
    }
}

impl<T: ValidateMaxChars> ValidateMaxChars for Option<T> {
    fn check_max_chars(&self, label: &str, max: usize, violations: &mut Violations) {
        if let Some(value) = self {
            value.check_max_chars(label, max, violations);
        }
    }
}
