//! Soft warnings raised by frame operations.
//!
//! A notice means the operation was skipped (wholly or for one field) and
//! the frame is otherwise unchanged. Notices are logged at `warn` level as
//! they happen and kept on the frame until taken.

/// A skipped operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The operation does not apply to a union-sourced query.
    UnionSourced { operation: &'static str },
    /// A named field is not in the frame.
    UnknownField {
        operation: &'static str,
        field: String,
    },
    /// A named field exists but is hidden.
    HiddenField {
        operation: &'static str,
        field: String,
    },
    /// The frame holds no document yet.
    EmptyFrame { operation: &'static str },
}

impl Notice {
    pub fn operation(&self) -> &'static str {
        match self {
            Notice::UnionSourced { operation }
            | Notice::UnknownField { operation, .. }
            | Notice::HiddenField { operation, .. }
            | Notice::EmptyFrame { operation } => operation,
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::UnionSourced { operation } => {
                write!(f, "{}: not supported on a union query, skipped", operation)
            }
            Notice::UnknownField { operation, field } => {
                write!(f, "{}: field '{}' not found, skipped", operation, field)
            }
            Notice::HiddenField { operation, field } => {
                write!(f, "{}: field '{}' is not selected, skipped", operation, field)
            }
            Notice::EmptyFrame { operation } => {
                write!(f, "{}: frame has no query, skipped", operation)
            }
        }
    }
}
