//! Plain HTTP render session.
//!
//! No scripts run, so this only works when the server already includes the share table
//! in its markup. The history tab cannot be activated.

use reqwest::blocking::Client;
use tracing::debug;

use crate::domain::{Instrument, PipelineConfig};
use crate::error::RenderError;
use crate::registry::detail_url;
use crate::render::{RawSnapshot, RenderSession, SessionOptions};

pub struct HttpSession {
    client: Client,
}

impl HttpSession {
    pub fn new(options: &SessionOptions, config: &PipelineConfig) -> Result<Self, RenderError> {
        let client = Client::builder()
            .user_agent(options.user_agent.clone())
            .timeout(config.waits.settle_timeout)
            .build()
            .map_err(|e| RenderError::Launch(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl RenderSession for HttpSession {
    fn snapshot(&mut self, instrument: &Instrument) -> Result<RawSnapshot, RenderError> {
        let url = detail_url(&instrument.id);
        let navigate_err = |reason: String| RenderError::Navigate {
            url: url.clone(),
            reason,
        };

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| navigate_err(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(navigate_err(format!("status {}", resp.status())));
        }

        let html = resp
            .text()
            .map_err(|e| RenderError::Capture(e.to_string()))?;
        debug!(code = %instrument.id, bytes = html.len(), "fetched static markup");
        Ok(RawSnapshot::new(instrument.id.clone(), html, false))
    }

    fn engine_name(&self) -> &'static str {
        "http"
    }
}
