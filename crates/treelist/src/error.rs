//! Error types for tree list lookups and consistency checks.

/// Result type alias for tree list operations.
pub type Result<T> = std::result::Result<T, TreeListError>;

/// Errors reported by checked lookups and invariant checks.
///
/// Mutations never fail: a mutation that cannot find its section is a
/// no-op. These errors come from the query side of the API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeListError {
    /// No section's group satisfied the matcher.
    #[error("No section matches the given group")]
    UnknownSection,

    /// Section number past the last section.
    #[error("Section {index} out of range ({count} sections)")]
    SectionOutOfRange { index: usize, count: usize },

    /// No row has this identity.
    #[error("No row with id '{id}' under parent {parent_id:?}")]
    UnknownRow {
        id: String,
        parent_id: Option<String>,
    },

    /// A section's flat sequence is inconsistent.
    #[error("Invariant violated in section {section} at row {row}: {message}")]
    InvariantViolation {
        section: usize,
        row: usize,
        message: String,
    },
}

impl TreeListError {
    /// Create an unknown-row error.
    pub fn unknown_row(id: impl Into<String>, parent_id: Option<&str>) -> Self {
        Self::UnknownRow {
            id: id.into(),
            parent_id: parent_id.map(str::to_owned),
        }
    }
}
