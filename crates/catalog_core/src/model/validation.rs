//! Field-level validation errors for catalog writes.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reasons a draft or request is rejected before touching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty after trim.
    BlankField(&'static str),
    /// Text field is longer than its column allows.
    FieldTooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
    /// Price is negative.
    NegativePrice,
    /// Price does not fit `NUMERIC(10, 2)`.
    PriceOutOfRange(String),
    /// Item has no category while the deployment requires one.
    CategoryRequired,
    /// Page size must be at least 1.
    InvalidPageSize(u32),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::FieldTooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "`{field}` is {actual_chars} chars, at most {max_chars} allowed"
            ),
            Self::NegativePrice => write!(f, "price must not be negative"),
            Self::PriceOutOfRange(value) => {
                write!(f, "price `{value}` exceeds 10 digits with scale 2")
            }
            Self::CategoryRequired => write!(f, "item category is required"),
            Self::InvalidPageSize(size) => write!(f, "page size must be >= 1, got {size}"),
        }
    }
}

impl Error for ValidationError {}

/// Checks a required bounded text field.
pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    let actual_chars = value.chars().count();
    if actual_chars > max_chars {
        return Err(ValidationError::FieldTooLong {
            field,
            max_chars,
            actual_chars,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{require_text, ValidationError};

    #[test]
    fn require_text_counts_chars_not_bytes() {
        assert!(require_text("name", "éééé", 4).is_ok());
        assert_eq!(
            require_text("name", "ééééé", 4),
            Err(ValidationError::FieldTooLong {
                field: "name",
                max_chars: 4,
                actual_chars: 5,
            })
        );
    }

    #[test]
    fn require_text_rejects_whitespace_only() {
        assert_eq!(
            require_text("code", "  \t", 32),
            Err(ValidationError::BlankField("code"))
        );
    }
}
