use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("CLI error: {source}")]
    Clap {
        #[from]
        source: clap::Error,
    },
    #[error("HTTP client error: {source}")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("{failed} of {total} scenarios failed")]
    ScenariosFailed { failed: usize, total: usize },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation<E>(error: E) -> Self
    where
        E: Into<ValidationError>,
    {
        error.into().into()
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing base URL (set --base-url or LINGOCHECK_URL).")]
    MissingBaseUrl,
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Base URL '{url}' cannot be a base for endpoint paths.")]
    BaseUrlCannotBeABase { url: String },
    #[error("Failed to join endpoint '{path}' onto base URL: {source}")]
    JoinEndpointFailed {
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid duration '{value}'. Supported suffixes: ms, s, m, h.")]
    InvalidDuration { value: String },
}
