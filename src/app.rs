use ratatui::widgets::ListState;

use crate::controller::{FeedController, LoadOutcome, Trigger};
use crate::fetch::FetchMsg;
use crate::source::Photo;

pub struct App {
    /// Paging state and the accumulated feed.
    pub feed: FeedController,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last fetch status message.
    pub status: String,
    /// Rows of the feed list visible in the last frame.
    pub viewport_rows: usize,
    /// Rows from the end of the feed that count as "near bottom".
    prefetch_margin: usize,
    /// Manual trigger queued by the input handler.
    pending: Option<Trigger>,
}

impl App {
    pub fn new(feed: FeedController, prefetch_margin: usize) -> Self {
        Self {
            feed,
            list_state: ListState::default(),
            quit: false,
            status: "Starting…".into(),
            viewport_rows: 0,
            prefetch_margin,
            pending: Some(Trigger::Initial),
        }
    }

    pub fn items(&self) -> &[Photo] {
        self.feed.items()
    }

    pub fn selected_item(&self) -> Option<&Photo> {
        self.list_state.selected().and_then(|i| self.items().get(i))
    }

    /// Queue a manual "load more".
    pub fn request_retry(&mut self) {
        self.pending = Some(Trigger::Retry);
    }

    /// Scroll-proximity sensor.
    ///
    /// True when the whole feed fits in the viewport, or when the selection
    /// is within `prefetch_margin` rows of the last item.
    pub fn near_bottom(&self) -> bool {
        let len = self.items().len();
        if len <= self.viewport_rows {
            return true;
        }
        let position = self.list_state.selected().unwrap_or(0);
        len.saturating_sub(position + 1) <= self.prefetch_margin
    }

    /// The trigger to offer the controller this tick, if any.
    ///
    /// A queued manual trigger takes priority over the sensor.  Whether the
    /// trigger actually starts a fetch is the controller's decision.
    pub fn next_trigger(&mut self) -> Option<Trigger> {
        self.pending
            .take()
            .or_else(|| self.near_bottom().then_some(Trigger::NearBottom))
    }

    /// Merge a settled fetch and update the status line.
    pub fn handle_fetch(&mut self, msg: FetchMsg) {
        let FetchMsg::Settled { cursor, result } = msg;
        self.status = match self.feed.settle(result) {
            Ok(LoadOutcome::Loaded { added }) => format!("Fetched {added} photos"),
            Ok(LoadOutcome::Exhausted) => "No more photos".into(),
            Ok(LoadOutcome::Skipped) => {
                tracing::warn!(cursor = %cursor, "dropped result for a fetch that was not outstanding");
                return;
            }
            Err(e) => format!("Error: {e} (r to retry)"),
        };
    }

    /// Mark the status line while a fetch is outstanding.
    pub fn mark_loading(&mut self) {
        self.status = "Loading…".into();
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.items().is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.items().len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.items().is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.items().is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.items().is_empty() {
            self.list_state.select(Some(self.items().len() - 1));
        }
    }
}
