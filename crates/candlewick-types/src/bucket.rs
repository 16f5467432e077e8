//! Candle-sized time buckets within a session.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{GapPolicy, Granularity, SessionWindow};

/// A single candle interval `(start, end]` aligned to the session open.
///
/// A trade exactly on `end` still belongs to this bucket; the bucket closes
/// on the first trade strictly after `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeBucket {
    /// Bucket start; also the candle's reported timestamp.
    pub start: DateTime<Utc>,
    /// Bucket end.
    pub end: DateTime<Utc>,
}

impl TimeBucket {
    /// Creates a bucket of the given granularity starting at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>, granularity: Granularity) -> Self {
        Self {
            start,
            end: start + granularity.duration(),
        }
    }

    /// Returns the first bucket of a session.
    #[must_use]
    pub fn first_in(window: &SessionWindow, granularity: Granularity) -> Self {
        Self::new(window.start, granularity)
    }

    /// Returns the bucket width.
    #[must_use]
    pub fn width(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Returns the adjacent following bucket.
    #[must_use]
    pub fn next(&self) -> Self {
        let width = self.width();
        Self {
            start: self.end,
            end: self.end + width,
        }
    }

    /// Returns true if a trade at `ts` closes this bucket.
    #[must_use]
    pub fn is_closed_by(&self, ts: DateTime<Utc>) -> bool {
        ts > self.end
    }

    /// Advances after the bucket was closed by `ts`.
    ///
    /// Returns `self` unchanged if `ts` does not close the bucket.
    #[must_use]
    pub fn advance_for(&self, ts: DateTime<Utc>, policy: GapPolicy) -> Self {
        if !self.is_closed_by(ts) {
            return *self;
        }
        match policy {
            GapPolicy::SingleStep => self.next(),
            GapPolicy::CatchUp => {
                let width = self.width();
                let shift = width * steps_to_cover(ts - self.end, width);
                Self {
                    start: self.start + shift,
                    end: self.end + shift,
                }
            }
        }
    }
}

/// Smallest number of `step`s whose sum is at least `overrun`.
pub(crate) fn steps_to_cover(overrun: TimeDelta, step: TimeDelta) -> i32 {
    let step_us = step.num_microseconds().unwrap_or(i64::MAX).max(1);
    let over_us = overrun.num_microseconds().unwrap_or(i64::MAX).max(0);
    let steps = over_us / step_us + i64::from(over_us % step_us != 0);
    i32::try_from(steps).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, hour, minute, second).unwrap()
    }

    #[test]
    fn test_bucket_bounds() {
        let bucket = TimeBucket::new(ts(7, 0, 0), Granularity::MINUTE_5);
        assert_eq!(bucket.end, ts(7, 5, 0));
        assert!(!bucket.is_closed_by(ts(7, 5, 0)));
        assert!(bucket.is_closed_by(ts(7, 5, 1)));
        assert_eq!(bucket.next().start, ts(7, 5, 0));
    }

    #[test]
    fn test_advance_policies() {
        let bucket = TimeBucket::new(ts(7, 0, 0), Granularity::MINUTE_5);
        let late = ts(7, 17, 30);

        assert_eq!(bucket.advance_for(late, GapPolicy::SingleStep).start, ts(7, 5, 0));
        assert_eq!(bucket.advance_for(late, GapPolicy::CatchUp).start, ts(7, 15, 0));
        assert_eq!(bucket.advance_for(ts(7, 3, 0), GapPolicy::CatchUp), bucket);
    }

    #[test]
    fn test_steps_to_cover() {
        let five = TimeDelta::minutes(5);
        assert_eq!(steps_to_cover(TimeDelta::seconds(1), five), 1);
        assert_eq!(steps_to_cover(TimeDelta::minutes(5), five), 1);
        assert_eq!(steps_to_cover(TimeDelta::minutes(11), five), 3);
    }
}
