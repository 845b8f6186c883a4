// src/store/error.rs
// Errors from the hosted database layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The project URL or table name doesn't form a valid endpoint
    #[error("invalid Supabase URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Transport-level failure or an undecodable body
    #[error("request to Supabase failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Supabase answered, but not with a 2xx
    #[error("Supabase responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },
}
