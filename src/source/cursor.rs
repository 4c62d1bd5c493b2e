//! The pagination cursor.
//!
//! A [`Cursor`] names the next page to fetch.  The API speaks in
//! `YYYY-MM-DD` dates, but the controller treats the value as opaque: it is
//! sent back verbatim as the `date` query parameter and replaced wholesale by
//! whatever `new_date` the server returns.

use std::fmt;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Format used for the `date` query parameter.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a raw value without validation (server-issued cursors).
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Cursor for today's date in the local timezone.
    pub fn today() -> Self {
        Self(Local::now().date_naive().format(DATE_FORMAT).to_string())
    }

    /// Parse a user-supplied date, rejecting anything that is not a real
    /// calendar date in `YYYY-MM-DD` form.
    pub fn parse_date(value: &str) -> Option<Self> {
        NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
            .ok()
            .map(|d| Self(d.format(DATE_FORMAT).to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
