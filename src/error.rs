//! Error types.
//!
//! [`FetchFailure`] is the one error the feed controller knows about: any
//! reason a page could not be retrieved.  The variants only exist so the
//! status bar and the log can say *why*; the controller treats them all the
//! same way.

use thiserror::Error;

/// A page fetch failed.  Feed and cursor are left untouched.
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status code: {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Loading or saving the configuration file failed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid start_date {0:?}, expected YYYY-MM-DD")]
    StartDate(String),
}
