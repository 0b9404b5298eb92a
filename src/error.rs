use axum::http::StatusCode;
use thiserror::Error;

/// Why a pipeline stopped, or why it had to fall back.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FailureKind {
    /// A required identifying input (query, username, repository) was absent.
    #[error("{0} is required")]
    MissingInput(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// An external collaborator (GitHub, the LLM) failed.
    #[error("{service} failed: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    /// An external collaborator answered but with nothing usable.
    #[error("{0} returned an empty response")]
    EmptyResponse(&'static str),

    #[error("configuration error: {0}")]
    Config(String),
}

impl FailureKind {
    /// Convert a collaborator error, keeping a `FailureKind` that was raised
    /// deeper down (e.g. a GitHub 404) instead of flattening it.
    pub fn upstream(service: &'static str, err: anyhow::Error) -> Self {
        match err.downcast::<FailureKind>() {
            Ok(kind) => kind,
            Err(err) => FailureKind::Upstream {
                service,
                message: format!("{err:#}"),
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            FailureKind::MissingInput(_) | FailureKind::InvalidInput(_) => StatusCode::BAD_REQUEST,
            FailureKind::NotFound(_) => StatusCode::NOT_FOUND,
            FailureKind::Upstream { .. } | FailureKind::EmptyResponse(_) => StatusCode::BAD_GATEWAY,
            FailureKind::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FailureKind> for (StatusCode, String) {
    fn from(kind: FailureKind) -> Self {
        (kind.status_code(), kind.to_string())
    }
}

/// Result of an operation that may have substituted a documented fallback
/// for a failed collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Complete(T),
    Degraded { value: T, cause: FailureKind },
}

impl<T> Outcome<T> {
    pub fn into_value(self) -> T {
        match self {
            Outcome::Complete(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn cause(&self) -> Option<&FailureKind> {
        match self {
            Outcome::Complete(_) => None,
            Outcome::Degraded { cause, .. } => Some(cause),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    /// Split into the value and a human-readable degradation note for API responses.
    pub fn into_parts(self) -> (T, Option<String>) {
        match self {
            Outcome::Complete(value) => (value, None),
            Outcome::Degraded { value, cause } => (value, Some(cause.to_string())),
        }
    }
}
