//! Readiness rules for a scripted detail page.
//!
//! The browser engine exposes its tab through `DetailPage`; everything here only sees
//! page content and a way to click the history tab.

use tracing::debug;

use crate::domain::WaitConfig;
use crate::error::RenderError;
use crate::render::Waiter;

/// Label of the tab that swaps the detail view for the share history.
pub const HISTORY_TAB_TEXT: &str = "历史规模";

/// What the readiness rules need from a loaded page.
pub trait DetailPage {
    /// Current rendered markup.
    fn content(&self) -> Result<String, RenderError>;

    /// Click the history tab. `Ok(false)` when it is not present or not clickable yet.
    fn click_history_tab(&self) -> Result<bool, RenderError>;
}

/// Wait until the page shows the share table or the history tab.
///
/// A timeout is not an error: the page is captured as it stands. Returns whether the
/// page became ready.
pub fn settle(page: &dyn DetailPage, waits: &WaitConfig, marker: &str) -> Result<bool, RenderError> {
    let waiter = Waiter::new(waits.settle_timeout, waits.poll_interval);
    let ready = waiter.until("share table or history tab", || {
        let html = page.content()?;
        Ok((html.contains(marker) || html.contains(HISTORY_TAB_TEXT)).then_some(()))
    });
    match ready {
        Ok(()) => Ok(true),
        Err(RenderError::Timeout { after, .. }) => {
            debug!(?after, "page not ready before settle timeout; capturing as-is");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Best effort: switch to the history view and wait for it to render.
///
/// The view only counts as shown once the content differs from what was on screen
/// before the click and carries the marker. A marker already present in the default
/// view does not count. Timeouts return `Ok(false)`; the caller captures whatever is
/// rendered.
pub fn open_history_tab(page: &dyn DetailPage, waits: &WaitConfig, marker: &str) -> Result<bool, RenderError> {
    let waiter = Waiter::new(waits.tab_timeout, waits.poll_interval);
    let before = page.content()?;

    match waiter.until("history tab", || Ok(page.click_history_tab()?.then_some(()))) {
        Ok(()) => {}
        Err(RenderError::Timeout { after, .. }) => {
            debug!(?after, "history tab not clickable; using current view");
            return Ok(false);
        }
        Err(e) => return Err(e),
    }

    let switched = waiter.until("share history table", || {
        let html = page.content()?;
        Ok((html != before && html.contains(marker)).then_some(()))
    });
    match switched {
        Ok(()) => Ok(true),
        Err(RenderError::Timeout { after, .. }) => {
            debug!(?after, "history tab clicked but the view did not change; using current view");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
