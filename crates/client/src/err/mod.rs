use reqwest::StatusCode;

/// Result alias used by every [`ContentApi`](crate::ContentApi) operation.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failure talking to the content repository.
///
/// The ORM layer never inspects these; they bubble to the caller unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid api url: {0}")]
    Url(#[from] url::ParseError),

    /// The API answered with a non-success status code.
    #[error("content api responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode api response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The API entry point did not advertise a master ref to query against.
    #[error("content api did not return a master ref")]
    NoMasterRef,

    #[error("invalid client configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// The HTTP status code, when the failure carries one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(err) => err.status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            body: "ref not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "content api responded with 404 Not Found: ref not found"
        );
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_other_error_is_transparent() {
        let err: ApiError = anyhow::anyhow!("socket closed").into();
        assert_eq!(err.to_string(), "socket closed");
        assert!(err.status().is_none());
    }
}
