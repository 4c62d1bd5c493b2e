//! Background page fetching.
//!
//! The UI loop never awaits the network.  When the controller accepts a
//! trigger, [`spawn`] runs the request on a tokio task and sends the settled
//! result back over an [`mpsc`] channel that the main loop drains on every
//! tick.
//!
//! ## For contributors
//!
//! The worker does exactly one request per call and has no retry, timeout
//! or cancellation.  Single-flight is the controller's job: only call
//! [`spawn`] with a cursor returned by
//! [`FeedController::request`](crate::controller::FeedController::request).

use std::sync::mpsc;
use std::sync::Arc;

use crate::error::FetchFailure;
use crate::source::{Cursor, Page, PhotoSource};

/// Messages sent from a fetch task to the UI thread.
pub enum FetchMsg {
    /// The fetch for this cursor has settled.
    Settled {
        cursor: Cursor,
        result: Result<Page, FetchFailure>,
    },
}

/// Fetch the page at `cursor` on a background task.
///
/// Must be called from inside a tokio runtime.  If the receiver has been
/// dropped by the time the fetch settles, the result is discarded.
pub fn spawn(
    source: Arc<dyn PhotoSource>,
    cursor: Cursor,
    tx: mpsc::Sender<FetchMsg>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let result = source.fetch_page(&cursor).await;
        if let Err(e) = &result {
            tracing::debug!(source = source.name(), cursor = %cursor, error = %e, "fetch task failed");
        }
        // The main thread has exited if the receiver is gone.
        let _ = tx.send(FetchMsg::Settled { cursor, result });
    })
}
