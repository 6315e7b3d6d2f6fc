//! Error surface of the audit engine.
//!
//! Only the primary page fetch is fatal. Auxiliary probes, image downloads
//! and performance-service calls degrade to documented fallback values and
//! never surface here.

use thiserror::Error;

/// Fatal failure of a page audit.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetch of {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}
