use thiserror::Error;

/// Failure of a single call against the remote catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("rate limited by catalog (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    #[error("catalog API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed catalog response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("token refresh failed: {0}")]
    Token(String),
}
