//! Render sessions: turn an instrument into a snapshot of its rendered detail page.
//!
//! A session is opened once per run, used for every instrument in turn, and torn down
//! when it is dropped. Engines:
//!
//! - `chrome`: headless Chromium, runs the page's scripts and opens the history tab
//! - `http`: a plain GET, for markup the server renders itself

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::domain::{Engine, Instrument, PipelineConfig};
use crate::error::RenderError;

pub mod chrome;
pub mod http;
pub mod page;
pub mod wait;

pub use chrome::ChromeSession;
pub use http::HttpSession;
pub use page::DetailPage;
pub use wait::Waiter;

/// Desktop Chrome identification, so the site serves its regular page.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Rendered markup for one instrument at one point in time.
#[derive(Debug, Clone)]
pub struct RawSnapshot {
    pub instrument_id: String,
    pub html: String,
    pub captured_at: DateTime<Utc>,
    /// Whether the history tab was activated before capture.
    pub history_view: bool,
}

impl RawSnapshot {
    pub fn new(instrument_id: impl Into<String>, html: impl Into<String>, history_view: bool) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            html: html.into(),
            captured_at: Utc::now(),
            history_view,
        }
    }
}

/// Produces snapshots for instruments, one at a time.
pub trait RenderSession {
    fn snapshot(&mut self, instrument: &Instrument) -> Result<RawSnapshot, RenderError>;

    fn engine_name(&self) -> &'static str;
}

/// Settings for starting a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub engine: Engine,
    pub user_agent: String,
    /// Explicit browser binary; `None` lets the engine locate one.
    pub chrome_path: Option<PathBuf>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            engine: Engine::Chrome,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chrome_path: None,
        }
    }
}

/// Start the configured engine. Failing here aborts the run: nothing can be collected.
pub fn open(options: &SessionOptions, config: &PipelineConfig) -> Result<Box<dyn RenderSession>, RenderError> {
    let session: Box<dyn RenderSession> = match options.engine {
        Engine::Chrome => Box::new(ChromeSession::launch(options, config)?),
        Engine::Http => Box::new(HttpSession::new(options, config)?),
    };
    tracing::info!(engine = session.engine_name(), "render session started");
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_stamped_at_capture() {
        let before = Utc::now();
        let snap = RawSnapshot::new("510300", "<table></table>", false);
        assert!(snap.captured_at >= before && snap.captured_at <= Utc::now());
        assert_eq!(snap.instrument_id, "510300");
        assert!(!snap.history_view);
    }

    #[test]
    fn http_engine_opens_without_a_browser() {
        let options = SessionOptions {
            engine: Engine::Http,
            ..SessionOptions::default()
        };
        let session = open(&options, &PipelineConfig::default()).unwrap();
        assert_eq!(session.engine_name(), "http");
    }
}
