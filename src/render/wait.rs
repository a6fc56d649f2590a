//! Poll-until-ready waits with an explicit upper bound.
//!
//! Pages on the source site render their tables client-side and give no readiness
//! signal, so every suspension point in a render session is a `Waiter`: a probe run
//! repeatedly until it yields a value or the timeout elapses.

use std::thread;
use std::time::{Duration, Instant};

use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waiter {
    timeout: Duration,
    poll_interval: Duration,
}

impl Waiter {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            // A zero interval would spin the probe.
            poll_interval: poll_interval.max(Duration::from_millis(1)),
        }
    }

    /// Run `probe` until it returns `Some`, an error, or the timeout elapses.
    ///
    /// The probe always runs at least once, even with a zero timeout. Probe errors are
    /// returned immediately; they are not retried.
    pub fn until<T, F>(&self, what: &'static str, mut probe: F) -> Result<T, RenderError>
    where
        F: FnMut() -> Result<Option<T>, RenderError>,
    {
        let started = Instant::now();
        loop {
            if let Some(value) = probe()? {
                return Ok(value);
            }
            let elapsed = started.elapsed();
            if elapsed >= self.timeout {
                return Err(RenderError::Timeout {
                    what,
                    after: self.timeout,
                });
            }
            thread::sleep(self.poll_interval.min(self.timeout - elapsed));
        }
    }
}
