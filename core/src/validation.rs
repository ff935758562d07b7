//! Input validation for catalog, child and booking records.

use thiserror::Error;

/// Result type alias for validation.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// A malformed input field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty.
    #[error("{field} is required")]
    Required {
        /// Field name
        field: &'static str,
    },

    /// A text field exceeds its length limit.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Field name
        field: &'static str,
        /// Maximum length in characters
        max: usize,
    },

    /// A list field has too many entries.
    #[error("{field} must contain at most {max} entries")]
    TooMany {
        /// Field name
        field: &'static str,
        /// Maximum number of entries
        max: usize,
    },

    /// A numeric field is outside its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        /// Field name
        field: &'static str,
        /// Inclusive lower bound
        min: String,
        /// Inclusive upper bound
        max: String,
    },

    /// A field does not match its expected format.
    #[error("{field} has an invalid format (expected {expected})")]
    InvalidFormat {
        /// Field name
        field: &'static str,
        /// Human readable description of the format
        expected: &'static str,
    },

    /// The lower bound of a range is above its upper bound.
    #[error("minimum {field} must be less than or equal to maximum {field}")]
    InvertedRange {
        /// Field name
        field: &'static str,
    },

    /// A field that is fixed at creation was changed.
    #[error("{field} cannot be changed after creation")]
    Immutable {
        /// Field name
        field: &'static str,
    },

    /// A booking was requested without children.
    #[error("at least one child must be selected")]
    NoChildren,

    /// The same child appears twice in one booking.
    #[error("a child can only be booked once per booking")]
    DuplicateChild,
}

/// Checks a required, length-limited text field.
///
/// # Errors
///
/// Returns [`ValidationError::Required`] for blank input and
/// [`ValidationError::TooLong`] when `value` has more than `max` characters.
pub fn required_text(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    max_text(field, value, max)
}

/// Checks an optional text field's length.
///
/// # Errors
///
/// Returns [`ValidationError::TooLong`] when `value` has more than `max` characters.
pub fn max_text(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

/// Checks a list of short strings: entry count and per-entry length.
///
/// # Errors
///
/// Returns [`ValidationError::TooMany`] or [`ValidationError::TooLong`].
pub fn text_list(
    field: &'static str,
    values: &[String],
    max_entries: Option<usize>,
    max_len: usize,
) -> Result<()> {
    if let Some(max) = max_entries {
        if values.len() > max {
            return Err(ValidationError::TooMany { field, max });
        }
    }
    values.iter().try_for_each(|value| max_text(field, value, max_len))
}

/// Checks that `value` lies in `[min, max]`.
///
/// # Errors
///
/// Returns [`ValidationError::OutOfRange`].
pub fn in_range<T>(field: &'static str, value: T, min: T, max: T) -> Result<()>
where
    T: PartialOrd + ToString,
{
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

/// Checks that a URL-ish field looks like an absolute http(s) URL.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidFormat`].
pub fn url(field: &'static str, value: &str) -> Result<()> {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.contains(char::is_whitespace) => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field,
            expected: "an http(s) URL",
        }),
    }
}
