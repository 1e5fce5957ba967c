use thiserror::Error;

/// Errors from the AniList catalog client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited: gave up after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("canceled")]
    Canceled,
}
