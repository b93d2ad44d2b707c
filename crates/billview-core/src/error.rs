//! Error types for field binding and the host form boundary.

use thiserror::Error;

use crate::field::FieldKind;

/// Failure reported by the host form when it refuses a read or write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("host form rejected {operation} on `{field}`: {message}")]
pub struct HostError {
    /// The host operation that failed, e.g. `"set_field_value"`.
    pub operation: &'static str,
    pub field: String,
    pub message: String,
}

impl HostError {
    pub fn new(operation: &'static str, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation,
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors from applying selected text to a form field.
///
/// Every variant is recoverable: the form is left untouched and the caller
/// may retry after the user changes focus or selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// No field has been focused in this session.
    #[error("no field is focused")]
    NoActiveField,

    /// The selection produced no text.
    #[error("no text to apply")]
    NoTextToApply,

    /// The field is neither a body field nor present on a current grid row.
    #[error("field `{field}` not found on the form or any current grid row")]
    FieldNotFound { field: String },

    /// The field is a date field and the text did not parse as a date.
    #[error("could not parse `{input}` as a date")]
    DateParseFailure { input: String },

    /// The field kind cannot receive free text.
    #[error("field `{field}` of kind {kind:?} cannot receive selected text")]
    UnsupportedFieldType { field: String, kind: FieldKind },

    /// The grid's current row changed between focus and write.
    #[error("current row of grid `{grid}` moved from {expected} to {actual:?}")]
    RowContextChanged {
        grid: String,
        expected: usize,
        actual: Option<usize>,
    },

    /// The host form refused the write.
    #[error(transparent)]
    Host(#[from] HostError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_error_display() {
        let err = HostError::new("set_field_value", "trandate", "field is disabled");
        assert_eq!(
            err.to_string(),
            "host form rejected set_field_value on `trandate`: field is disabled"
        );
    }

    #[test]
    fn binding_error_from_host() {
        let err: BindingError = HostError::new("focus_field", "memo", "gone").into();
        assert!(matches!(err, BindingError::Host(_)));
        assert_eq!(err.to_string(), "host form rejected focus_field on `memo`: gone");
    }

    #[test]
    fn binding_error_messages() {
        assert_eq!(BindingError::NoActiveField.to_string(), "no field is focused");
        assert_eq!(
            BindingError::DateParseFailure {
                input: "Net 30".into()
            }
            .to_string(),
            "could not parse `Net 30` as a date"
        );
        assert_eq!(
            BindingError::RowContextChanged {
                grid: "expense".into(),
                expected: 2,
                actual: None,
            }
            .to_string(),
            "current row of grid `expense` moved from 2 to None"
        );
    }
}
