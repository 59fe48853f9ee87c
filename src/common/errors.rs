/// Failure of the word-count extraction of a remote page.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("Non OK Http status returned: {0}")]
    NonOkStatus(u16),
    #[error("Not an HTML document: {0}")]
    NotADocument(String),
    #[error("Error while reading response: {0}")]
    ReadResponseError(#[from] reqwest::Error),
    #[error("Error while sending request: {0}")]
    HttpError(#[from] reqwest_middleware::Error),
}

/// Machine checkable category of a [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    UnprocessableInput,
    Database,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("{0}")]
    UnprocessableInput(&'static str),
    #[error("Invalid article URL")]
    Fetch(#[from] FetchError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Conflict(_) => ErrorKind::Conflict,
            StoreError::UnprocessableInput(_) => ErrorKind::UnprocessableInput,
            StoreError::Fetch(_) => ErrorKind::UnprocessableInput,
            StoreError::Database(_) => ErrorKind::Database,
        }
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Translate constraint violations reported by the database into domain errors.
///
/// The pre-checks done before a write can race with a concurrent request, the
/// constraints of the schema are what actually closes that window.
pub(crate) fn map_constraint_violation(
    error: sqlx::Error,
    on_unique: StoreError,
    on_foreign_key: StoreError,
) -> StoreError {
    match &error {
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => on_unique,
        sqlx::Error::Database(db_error) if db_error.is_foreign_key_violation() => on_foreign_key,
        _ => StoreError::Database(error),
    }
}
