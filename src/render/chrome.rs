//! Headless Chromium render session.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::debug;

use crate::domain::{Instrument, PipelineConfig, WaitConfig};
use crate::error::RenderError;
use crate::registry::detail_url;
use crate::render::page::{self, DetailPage};
use crate::render::{RawSnapshot, RenderSession, SessionOptions};

/// Anchor whose text is `HISTORY_TAB_TEXT`.
const HISTORY_TAB_XPATH: &str = "//a[contains(text(),'历史规模')]";

/// Unattended container runs: no GPU, small /dev/shm.
const CHROME_ARGS: [&str; 2] = ["--disable-gpu", "--disable-dev-shm-usage"];

/// Keep the browser alive across slow pages; the run tears it down explicitly.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(300);

pub struct ChromeSession {
    // Dropped before the browser that owns it.
    tab: Arc<Tab>,
    _browser: Browser,
    waits: WaitConfig,
    table_marker: String,
}

impl ChromeSession {
    pub fn launch(options: &SessionOptions, config: &PipelineConfig) -> Result<Self, RenderError> {
        let launch = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .path(options.chrome_path.clone())
            .args(CHROME_ARGS.iter().map(|arg| OsStr::new(*arg)).collect())
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .build()
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let browser = Browser::new(launch).map_err(|e| RenderError::Launch(describe(&e)))?;
        let tab = browser
            .new_tab()
            .map_err(|e| RenderError::Launch(format!("failed to open tab: {}", describe(&e))))?;
        tab.set_default_timeout(config.waits.settle_timeout.max(Duration::from_secs(30)));
        tab.set_user_agent(&options.user_agent, None, None)
            .map_err(|e| RenderError::Launch(format!("failed to set user agent: {}", describe(&e))))?;

        Ok(Self {
            tab,
            _browser: browser,
            waits: config.waits,
            table_marker: config.table_marker.clone(),
        })
    }
}

impl DetailPage for ChromeSession {
    fn content(&self) -> Result<String, RenderError> {
        self.tab
            .get_content()
            .map_err(|e| RenderError::Capture(describe(&e)))
    }

    fn click_history_tab(&self) -> Result<bool, RenderError> {
        let Ok(element) = self.tab.find_element_by_xpath(HISTORY_TAB_XPATH) else {
            return Ok(false);
        };
        Ok(element.click().is_ok())
    }
}

impl RenderSession for ChromeSession {
    fn snapshot(&mut self, instrument: &Instrument) -> Result<RawSnapshot, RenderError> {
        let url = detail_url(&instrument.id);
        self.tab
            .navigate_to(&url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| RenderError::Navigate {
                url: url.clone(),
                reason: describe(&e),
            })?;

        let this: &Self = self;
        if !page::settle(this, &this.waits, &this.table_marker)? {
            debug!(code = %instrument.id, "page did not settle; trying the history tab anyway");
        }
        let history_view = page::open_history_tab(this, &this.waits, &this.table_marker)?;
        let html = this.content()?;
        Ok(RawSnapshot::new(instrument.id.clone(), html, history_view))
    }

    fn engine_name(&self) -> &'static str {
        "chrome"
    }
}

/// Browser errors carry their cause chain; keep all of it on one line.
fn describe(err: &anyhow::Error) -> String {
    format!("{err:#}")
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if let Err(e) = self.tab.close(false) {
            debug!(error = %e, "failed to close tab");
        }
        // The browser process is killed when `_browser` drops right after this.
        debug!("browser session closed");
    }
}
