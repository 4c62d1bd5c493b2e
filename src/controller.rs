//! Feed pagination controller.
//!
//! [`FeedController`] owns the three pieces of paging state: the [`Cursor`]
//! for the next request, the accumulated feed, and whether a fetch is in
//! flight.  It decides whether a trigger may start a fetch and how a settled
//! fetch is merged.
//!
//! ```text
//!            request(trigger)              settle(Ok, non-empty) / settle(Err)
//!   ┌──────┐ ───────────────► ┌──────────┐ ──────────────────────────────► ┌──────┐
//!   │ Idle │                  │ Fetching │                                 │ Idle │
//!   └──────┘                  └──────────┘ ──────────────────────────────► ┌───────────┐
//!                                  ▲         settle(Ok, empty)             │ Exhausted │
//!                                  └────────────── Trigger::Retry ──────── └───────────┘
//! ```
//!
//! The controller never performs I/O itself except in
//! [`load_more`](FeedController::load_more); the UI loop instead calls
//! [`request`](FeedController::request), runs the fetch on a background task
//! (see [`crate::fetch`]) and hands the result to
//! [`settle`](FeedController::settle).  Either way at most one fetch is
//! outstanding: every trigger is rejected while the state is `Fetching`.

use std::collections::HashSet;

use crate::error::FetchFailure;
use crate::source::{Cursor, Page, Photo, PhotoSource};

/// Paging state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    /// Nothing outstanding; more pages may exist.
    Idle,
    /// A request has been issued and has not settled yet.
    Fetching,
    /// The last successful page was empty, or repeated the previous cursor
    /// without adding anything.
    Exhausted,
}

/// What asked for the next page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// First load at session start.
    Initial,
    /// Scroll-proximity sensor: the selection is near the end of the feed.
    NearBottom,
    /// Explicit user request ("load more" / retry).
    Retry,
}

/// Result of a settled (or skipped) load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page arrived; `added` items were appended.
    Loaded { added: usize },
    /// The page was empty; the feed is now exhausted.
    Exhausted,
    /// No request was issued because the trigger was rejected.
    Skipped,
}

pub struct FeedController {
    cursor: Cursor,
    /// Append-only, arrival order.
    items: Vec<Photo>,
    /// Keys already present in `items`.
    keys: HashSet<String>,
    state: FeedState,
    /// Description of the most recent failure, cleared by the next success.
    last_error: Option<String>,
}

impl FeedController {
    /// Empty feed positioned at `cursor`.
    pub fn new(cursor: Cursor) -> Self {
        Self {
            cursor,
            items: Vec::new(),
            keys: HashSet::new(),
            state: FeedState::Idle,
            last_error: None,
        }
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn items(&self) -> &[Photo] {
        &self.items
    }

    pub fn state(&self) -> FeedState {
        self.state
    }

    pub fn in_flight(&self) -> bool {
        self.state == FeedState::Fetching
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == FeedState::Exhausted
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Ask to start a fetch.
    ///
    /// Returns the cursor to fetch with and moves to `Fetching` when the
    /// trigger is accepted; returns `None` (and changes nothing) otherwise.
    ///
    /// * `Initial` and `Retry` are accepted whenever nothing is in flight.
    /// * `NearBottom` is accepted only from `Idle` and only if the previous
    ///   fetch succeeded, so a failing server is never polled automatically.
    pub fn request(&mut self, trigger: Trigger) -> Option<Cursor> {
        let accepted = match (trigger, self.state) {
            (_, FeedState::Fetching) => false,
            (Trigger::NearBottom, FeedState::Idle) => self.last_error.is_none(),
            (Trigger::NearBottom, FeedState::Exhausted) => false,
            (Trigger::Initial | Trigger::Retry, _) => true,
        };

        if !accepted {
            tracing::trace!(?trigger, state = ?self.state, "trigger rejected");
            return None;
        }

        tracing::debug!(?trigger, cursor = %self.cursor, "starting fetch");
        self.state = FeedState::Fetching;
        Some(self.cursor.clone())
    }

    /// Merge the result of the fetch started by [`request`](Self::request).
    ///
    /// On success the cursor is replaced and the photos are appended in
    /// order.  On failure cursor and feed are left exactly as they were and
    /// the error is handed back.  In both cases the controller leaves
    /// `Fetching`.
    pub fn settle(&mut self, result: Result<Page, FetchFailure>) -> Result<LoadOutcome, FetchFailure> {
        if self.state != FeedState::Fetching {
            tracing::warn!(state = ?self.state, "settle without an outstanding fetch, ignoring");
            return Ok(LoadOutcome::Skipped);
        }

        match result {
            Ok(page) => {
                let stalled = page.new_date == self.cursor;
                self.cursor = page.new_date;
                self.last_error = None;

                if page.photos.is_empty() {
                    tracing::info!(cursor = %self.cursor, "feed exhausted");
                    self.state = FeedState::Exhausted;
                    return Ok(LoadOutcome::Exhausted);
                }

                let added = self.append(page.photos);

                // Nothing new and the cursor didn't move: asking again would
                // return the same page.
                if added == 0 && stalled {
                    tracing::warn!(cursor = %self.cursor, "page made no progress, treating feed as exhausted");
                    self.state = FeedState::Exhausted;
                    return Ok(LoadOutcome::Exhausted);
                }

                self.state = FeedState::Idle;
                tracing::info!(added, total = self.items.len(), cursor = %self.cursor, "page merged");
                Ok(LoadOutcome::Loaded { added })
            }
            Err(e) => {
                tracing::warn!(cursor = %self.cursor, error = %e, "fetch failed");
                self.last_error = Some(e.to_string());
                self.state = FeedState::Idle;
                Err(e)
            }
        }
    }

    /// Fetch and merge the next page from `source`.
    ///
    /// Behaves like a [`Trigger::Retry`]: returns
    /// [`LoadOutcome::Skipped`] without touching the network if a fetch is
    /// already outstanding.
    pub async fn load_more<S>(&mut self, source: &S) -> Result<LoadOutcome, FetchFailure>
    where
        S: PhotoSource + ?Sized,
    {
        let Some(cursor) = self.request(Trigger::Retry) else {
            return Ok(LoadOutcome::Skipped);
        };
        let result = source.fetch_page(&cursor).await;
        self.settle(result)
    }

    /// Append photos whose key is not already in the feed.  First copy wins.
    fn append(&mut self, photos: Vec<Photo>) -> usize {
        let before = self.items.len();
        for photo in photos {
            if self.keys.insert(photo.date.clone()) {
                self.items.push(photo);
            } else {
                tracing::debug!(key = %photo.date, "duplicate photo skipped");
            }
        }
        self.items.len() - before
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
