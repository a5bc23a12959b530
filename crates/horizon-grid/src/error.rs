//! Error types for the grid core.
//!
//! Validation failures are not errors: they are collected into a
//! [`ValidationErrors`](crate::edit::ValidationErrors) map and never cross the
//! API boundary as `Err`.

/// Result type alias for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors raised while resolving or managing the column schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColumnError {
    /// Two columns resolved to the same id.
    #[error("duplicate column id '{0}'")]
    DuplicateId(String),

    /// More than one column is marked as primary key.
    #[error("columns '{first}' and '{second}' are both marked as primary key")]
    DuplicatePrimaryKey { first: String, second: String },

    /// A group column declared its own field.
    #[error("group column '{0}' must not declare a field")]
    GroupWithField(String),

    /// A nested column is frozen to a side its group is not frozen to.
    #[error("column '{0}' is frozen inside a group with a different freeze")]
    NestedFreeze(String),

    /// No column is bound to the given field.
    #[error("no column bound to field '{0}'")]
    UnknownField(String),

    /// No column has the given id.
    #[error("no column with id '{0}'")]
    UnknownId(String),

    /// The column is not allowed to move.
    #[error("column '{0}' cannot be reordered")]
    NotReorderable(String),

    /// Target position is outside the sibling list.
    #[error("column position {index} is out of range ({count} siblings)")]
    PositionOutOfRange { index: usize, count: usize },

    /// The column does not allow the requested operation.
    #[error("column '{field}' does not allow {operation}")]
    OperationNotAllowed { field: String, operation: &'static str },
}

/// Errors reported by a data source.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    /// The data source rejected the query or mutation.
    #[error("data source rejected the request: {0}")]
    Rejected(String),

    /// No record carries the given primary-key value.
    #[error("no record with key {0}")]
    KeyNotFound(String),

    /// A record with the given key already exists.
    #[error("a record with key {0} already exists")]
    DuplicateKey(String),
}

impl QueryError {
    /// Create a rejection error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// Errors raised while parsing display text back into a value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    /// The input could not be parsed as the expected type.
    #[error("cannot parse '{input}' as {expected}")]
    Parse { input: String, expected: &'static str },
}

impl FormatError {
    /// Create a parse error.
    pub fn parse(input: impl Into<String>, expected: &'static str) -> Self {
        Self::Parse {
            input: input.into(),
            expected,
        }
    }
}

/// The umbrella error type for grid operations.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Column schema error.
    #[error(transparent)]
    Column(#[from] ColumnError),

    /// Data source error.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Value parse error.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Settings could not be loaded.
    #[error("invalid grid settings: {0}")]
    Settings(#[from] toml::de::Error),

    /// Editing or deleting is enabled but no column is a primary key.
    #[error("editing requires a primary-key column")]
    MissingPrimaryKey,

    /// A row position is outside the current view window.
    #[error("row {index} is outside the current view ({len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    /// No record in the current view carries the given primary-key value.
    #[error("no record with key {0} in the current view")]
    RecordNotFound(String),

    /// A page number is outside the available pages.
    #[error("page {page} is out of range (1..={page_count})")]
    PageOutOfRange { page: usize, page_count: usize },

    /// The operation needs an active edit session.
    #[error("no edit session is active")]
    NoActiveSession,

    /// A slot connected to `action_begin` cancelled the operation.
    #[error("{0} was cancelled")]
    Cancelled(&'static str),

    /// The operation is disabled by the edit settings.
    #[error("{0} is disabled by the grid settings")]
    Disabled(&'static str),
}
