use axum::http::StatusCode;

/// Outcome of a failed resolution or creation attempt.
///
/// Every variant except `Store` is *weak*: it is caused by caller input and
/// its message is safe to report verbatim.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Template must contains _id, shortid, name or content attribute")]
    MissingIdentifyingInfo,

    #[error("Invalid template path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Unable to find specified template or user doesnt have permissions to read it: {value}")]
    TemplateNotFound { value: String },

    #[error("Duplicated templates found for query {field}: {value}")]
    AmbiguousResolution { field: String, value: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl ResolveError {
    pub fn invalid_path(path: &str, reason: &str) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Caller-caused errors, safe to surface as-is
    pub fn is_weak(&self) -> bool {
        !matches!(self, ResolveError::Store(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ResolveError::TemplateNotFound { .. } => StatusCode::NOT_FOUND,
            ResolveError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ResolveError::MissingIdentifyingInfo
            | ResolveError::InvalidPath { .. }
            | ResolveError::AmbiguousResolution { .. }
            | ResolveError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ResolveError::MissingIdentifyingInfo.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ResolveError::TemplateNotFound {
                value: "x".to_string()
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ResolveError::invalid_path("a/b", "must be absolute").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_store_errors_are_not_weak() {
        let err = ResolveError::from(anyhow::anyhow!("connection refused"));
        assert!(!err.is_weak());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(ResolveError::Validation("engine required".to_string()).is_weak());
    }
}
