//! Custom error types for sitesnap

use thiserror::Error;

/// Main error type for sitesnap operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed URL: {0}")]
    MalformedUrl(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Render timed out: {0}")]
    RenderTimeout(String),

    #[error("HTTP {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Nothing to generate from: rendered page is empty")]
    EmptyInput,

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for sitesnap
pub type Result<T> = std::result::Result<T, Error>;

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::MalformedUrl(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Error::Timeout(err.to_string());
        }
        if let Some(status) = err.status() {
            return Error::HttpStatus {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            };
        }
        if err.is_builder() {
            return Error::Internal(err.to_string());
        }
        Error::Network(err.to_string())
    }
}

/// Error category as seen by callers at the request boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedUrl,
    Timeout,
    RenderTimeout,
    HttpError,
    NetworkError,
    NavigationError,
    EmptyInput,
    GenerationError,
    InternalError,
}

impl ErrorKind {
    /// HTTP status a transport layer should answer with for this category
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Timeout | ErrorKind::RenderTimeout => 408,
            ErrorKind::MalformedUrl
            | ErrorKind::HttpError
            | ErrorKind::NetworkError
            | ErrorKind::NavigationError
            | ErrorKind::GenerationError => 400,
            ErrorKind::EmptyInput => 422,
            ErrorKind::InternalError => 500,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::MalformedUrl => "MalformedURL",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::RenderTimeout => "RenderTimeout",
            ErrorKind::HttpError => "HttpError",
            ErrorKind::NetworkError => "NetworkError",
            ErrorKind::NavigationError => "NavigationError",
            ErrorKind::EmptyInput => "EmptyInput",
            ErrorKind::GenerationError => "GenerationError",
            ErrorKind::InternalError => "InternalError",
        };
        f.write_str(name)
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedUrl(_) => ErrorKind::MalformedUrl,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::RenderTimeout(_) => ErrorKind::RenderTimeout,
            Error::HttpStatus { .. } => ErrorKind::HttpError,
            Error::Network(_) => ErrorKind::NetworkError,
            Error::Navigation(_) => ErrorKind::NavigationError,
            Error::EmptyInput => ErrorKind::EmptyInput,
            Error::Generation(_) => ErrorKind::GenerationError,
            Error::Config(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Whether a crawl can drop the failing page and keep going
    pub fn is_page_local(&self) -> bool {
        matches!(
            self,
            Error::MalformedUrl(_)
                | Error::Timeout(_)
                | Error::HttpStatus { .. }
                | Error::Network(_)
        )
    }

    /// Message safe to show to a remote caller.
    ///
    /// Internal failures are reduced to an opaque message; log the error itself
    /// before surfacing this.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::InternalError => "Internal server error".to_string(),
            ErrorKind::Timeout => "Request timed out".to_string(),
            _ => self.to_string(),
        }
    }
}
