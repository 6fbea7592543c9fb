use thiserror::Error;

/// Rejection raised by model constructors and guarded setters.
///
/// Validation always runs before assignment, so a record that produced this
/// error still holds its previous state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },
}

impl ModelError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidArgument { field, .. } => field,
        }
    }
}

pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Failure reported by [`Database`](crate::db::Database).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A row with the same unique key is already stored.
    #[error("{entity} already exists: {key}")]
    Duplicate { entity: &'static str, key: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: uuid::Uuid },

    /// A stored row no longer passes model validation.
    #[error("invalid stored record: {0}")]
    Invalid(#[from] ModelError),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("could not determine data directory")]
    NoDataDir,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: uuid::Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}
