//! Daily trading-session gate.

use candlewick_types::{GapPolicy, SessionWindow};
use chrono::{DateTime, Utc};

/// Admits only trades strictly inside the current session window.
///
/// The window rolls forward in whole days whenever a trade lands past its
/// end. Trades before the open, on either boundary, or in the gap between
/// two sessions are rejected.
#[derive(Debug, Clone)]
pub struct SessionFilter {
    window: SessionWindow,
    policy: GapPolicy,
}

impl SessionFilter {
    /// Creates a filter starting at the given window.
    #[must_use]
    pub const fn new(window: SessionWindow, policy: GapPolicy) -> Self {
        Self { window, policy }
    }

    /// Returns the current session window.
    #[must_use]
    pub const fn window(&self) -> SessionWindow {
        self.window
    }

    /// Rolls the window if needed, then returns whether `ts` is admitted.
    pub fn admit(&mut self, ts: DateTime<Utc>) -> bool {
        self.window = self.window.advance_for(ts, self.policy);
        self.window.contains(ts)
    }
}
