//! Photo source abstraction layer.
//!
//! This module defines the [`PhotoSource`] trait and the wire types it
//! returns ([`Page`], [`Photo`], [`Cursor`]).  The HTTP implementation lives
//! in [`api`].
//!
//! ## For contributors: adding a new source
//!
//! 1. Create a new file in this directory (e.g. `archive.rs`).
//! 2. Define a struct and implement [`PhotoSource`] for it.
//! 3. Add `mod archive;` below and re-export your struct.
//! 4. Construct it in `main.rs` instead of [`ApiSource`].
//!
//! The controller, fetch worker and UI never look past the trait.

mod api;
mod cursor;
mod photo;

pub use api::ApiSource;
pub use cursor::Cursor;
pub use photo::{Page, Photo};

use async_trait::async_trait;

use crate::error::FetchFailure;

/// Trait that every photo source must implement.
///
/// [`fetch_page`](PhotoSource::fetch_page) is called from a tokio task, so
/// implementations must be [`Send`] + [`Sync`].
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Human-readable label for log lines and the status bar.
    fn name(&self) -> &str;

    /// Fetch the page starting at `cursor`.
    ///
    /// Every failure (transport, status, body) maps to [`FetchFailure`].
    async fn fetch_page(&self, cursor: &Cursor) -> Result<Page, FetchFailure>;
}
