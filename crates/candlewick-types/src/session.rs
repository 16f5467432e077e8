//! Daily trading session configuration and windows.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::SessionConfigError;
use crate::bucket::steps_to_cover;

/// How a session window or time bucket advances when a trade lands past its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GapPolicy {
    /// Advance exactly one step, even if the trade is still beyond the new end.
    ///
    /// The session filter then drops trades until its window has stepped up to
    /// them. An aggregator only ever sees admitted trades, so its session
    /// always realigns to the trade's window; only its buckets step singly.
    SingleStep,
    /// Advance as many whole steps as needed for the end to reach the trade.
    #[default]
    CatchUp,
}

impl std::str::FromStr for GapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single-step" | "single" => Ok(Self::SingleStep),
            "catch-up" | "catchup" => Ok(Self::CatchUp),
            _ => Err(format!(
                "invalid gap policy '{s}', expected one of: single-step, catch-up"
            )),
        }
    }
}

/// Daily trading session: when it opens and how long it lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    start_of_day: NaiveTime,
    length: TimeDelta,
}

impl SessionConfig {
    /// Creates a session configuration.
    ///
    /// # Errors
    ///
    /// Returns an error unless `0 < length < 24h`.
    pub fn new(start_of_day: NaiveTime, length: TimeDelta) -> Result<Self, SessionConfigError> {
        if length <= TimeDelta::zero() {
            return Err(SessionConfigError::NonPositiveLength {
                minutes: length.num_minutes(),
            });
        }
        if length >= TimeDelta::days(1) {
            return Err(SessionConfigError::LongerThanDay {
                minutes: length.num_minutes(),
            });
        }
        Ok(Self {
            start_of_day,
            length,
        })
    }

    /// Returns the time of day the session opens.
    #[must_use]
    pub const fn start_of_day(&self) -> NaiveTime {
        self.start_of_day
    }

    /// Returns the session length.
    #[must_use]
    pub const fn length(&self) -> TimeDelta {
        self.length
    }

    /// Returns the session window opening on `date`.
    #[must_use]
    pub fn window_for(&self, date: NaiveDate) -> SessionWindow {
        let start = date.and_time(self.start_of_day).and_utc();
        SessionWindow::new(start, self.length)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            start_of_day: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or(NaiveTime::MIN),
            length: TimeDelta::hours(20),
        }
    }
}

/// One concrete trading session, the open interval `(start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionWindow {
    /// Session open.
    pub start: DateTime<Utc>,
    /// Session close.
    pub end: DateTime<Utc>,
}

impl SessionWindow {
    /// Creates a window of `length` starting at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>, length: TimeDelta) -> Self {
        Self {
            start,
            end: start + length,
        }
    }

    /// Returns the session length.
    #[must_use]
    pub fn length(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Returns true if `ts` lies strictly inside the window.
    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start < ts && ts < self.end
    }

    /// Returns true if `ts` is past the window's end.
    #[must_use]
    pub fn is_overrun_by(&self, ts: DateTime<Utc>) -> bool {
        ts > self.end
    }

    /// Returns the same window one day later.
    #[must_use]
    pub fn next_day(&self) -> Self {
        let day = TimeDelta::days(1);
        Self {
            start: self.start + day,
            end: self.end + day,
        }
    }

    /// Advances the window in whole days after it was overrun by `ts`.
    ///
    /// Returns `self` unchanged if `ts` does not overrun the window.
    #[must_use]
    pub fn advance_for(&self, ts: DateTime<Utc>, policy: GapPolicy) -> Self {
        if !self.is_overrun_by(ts) {
            return *self;
        }
        match policy {
            GapPolicy::SingleStep => self.next_day(),
            GapPolicy::CatchUp => {
                let day = TimeDelta::days(1);
                let shift = day * steps_to_cover(ts - self.end, day);
                Self {
                    start: self.start + shift,
                    end: self.end + shift,
                }
            }
        }
    }
}

impl std::fmt::Display for SessionWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.start.format("%Y-%m-%d %H:%M:%S"),
            self.end.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, minute, second).unwrap()
    }

    fn window() -> SessionWindow {
        SessionConfig::default().window_for(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
    }

    #[test]
    fn test_default_window() {
        let w = window();
        assert_eq!(w.start, ts(15, 7, 0, 0));
        assert_eq!(w.end, ts(16, 3, 0, 0));
        assert_eq!(w.length(), TimeDelta::hours(20));
    }

    #[test]
    fn test_contains_is_exclusive() {
        let w = window();
        assert!(!w.contains(ts(15, 7, 0, 0)));
        assert!(w.contains(ts(15, 7, 0, 1)));
        assert!(w.contains(ts(16, 2, 59, 59)));
        assert!(!w.contains(ts(16, 3, 0, 0)));
        assert!(!w.contains(ts(15, 6, 59, 59)));
    }

    #[test]
    fn test_advance_single_step() {
        let w = window();
        assert_eq!(w.advance_for(ts(16, 2, 0, 0), GapPolicy::SingleStep), w);

        let next = w.advance_for(ts(19, 9, 0, 0), GapPolicy::SingleStep);
        assert_eq!(next.start, ts(16, 7, 0, 0));
        assert_eq!(next.end, ts(17, 3, 0, 0));
    }

    #[test]
    fn test_advance_catch_up() {
        let w = window();

        let next = w.advance_for(ts(16, 3, 0, 1), GapPolicy::CatchUp);
        assert_eq!(next.start, ts(16, 7, 0, 0));

        let later = w.advance_for(ts(19, 9, 0, 0), GapPolicy::CatchUp);
        assert_eq!(later.start, ts(19, 7, 0, 0));
        assert!(later.contains(ts(19, 9, 0, 0)));

        // Exactly on a later end: stop there, the trade is then a boundary trade.
        let edge = w.advance_for(ts(18, 3, 0, 0), GapPolicy::CatchUp);
        assert_eq!(edge.end, ts(18, 3, 0, 0));
    }

    #[test]
    fn test_config_validation() {
        let seven = NaiveTime::from_hms_opt(7, 0, 0).unwrap();
        assert!(SessionConfig::new(seven, TimeDelta::zero()).is_err());
        assert!(SessionConfig::new(seven, TimeDelta::hours(24)).is_err());
        assert!(SessionConfig::new(seven, TimeDelta::hours(8)).is_ok());
    }

    #[test]
    fn test_gap_policy_parse() {
        assert_eq!("single-step".parse::<GapPolicy>().unwrap(), GapPolicy::SingleStep);
        assert_eq!("CatchUp".parse::<GapPolicy>().unwrap(), GapPolicy::CatchUp);
        assert!("loop".parse::<GapPolicy>().is_err());
    }
}
