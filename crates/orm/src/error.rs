//! Errors surfaced by ORM operations.

use prismic_client::ApiError;

/// Result alias for every fallible ORM call.
pub type OrmResult<T> = Result<T, OrmError>;

#[derive(Debug, thiserror::Error)]
pub enum OrmError {
    /// A caller supplied value the ORM cannot act on, such as an unknown
    /// relation name or publication date unit.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure of the underlying content API, passed through unchanged.
    #[error(transparent)]
    Transport(#[from] ApiError),
}

impl OrmError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        OrmError::InvalidArgument(message.into())
    }

    /// The transport failure, when this is one.
    pub fn transport(&self) -> Option<&ApiError> {
        match self {
            OrmError::Transport(err) => Some(err),
            OrmError::InvalidArgument(_) => None,
        }
    }
}
