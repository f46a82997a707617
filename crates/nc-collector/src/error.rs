//! Scrape failure kinds.

use thiserror::Error;

/// Why a single scrape produced no data.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Transport failure: connect, TLS, timeout, or body read.
    #[error("serverinfo request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The endpoint answered with something other than 200 OK.
    #[error("serverinfo returned HTTP {status}")]
    HttpStatus { status: reqwest::StatusCode },

    #[error(transparent)]
    Decode(#[from] nc_core::DecodeError),
}

impl ScrapeError {
    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::Fetch(e) if e.is_timeout() => "timeout",
            ScrapeError::Fetch(_) => "fetch",
            ScrapeError::HttpStatus { .. } => "http_status",
            ScrapeError::Decode(_) => "decode",
        }
    }
}
