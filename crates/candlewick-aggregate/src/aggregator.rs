//! Streaming trade-to-candle aggregation.

use std::collections::HashMap;

use candlewick_types::{GapPolicy, Granularity, SessionWindow, TimeBucket, Trade};
use chrono::{DateTime, Utc};

use crate::Candle;

/// Streaming candle aggregator for a single granularity.
///
/// Buckets are aligned to the session open. One accumulator per ticker is
/// kept for the current bucket; when a trade arrives past the bucket end, or
/// past the session end, every open accumulator is flushed as a [`Candle`].
/// A ticker that saw no trade in a bucket yields no candle for it.
///
/// Trades are expected in non-decreasing timestamp order; `close` follows
/// arrival order.
#[derive(Debug)]
pub struct CandleAggregator {
    granularity: Granularity,
    policy: GapPolicy,
    session: SessionWindow,
    bucket: TimeBucket,
    open: HashMap<String, CandleBuilder>,
}

impl CandleAggregator {
    /// Creates an aggregator whose first bucket opens with `session`.
    #[must_use]
    pub fn new(granularity: Granularity, session: SessionWindow, policy: GapPolicy) -> Self {
        Self {
            granularity,
            policy,
            session,
            bucket: TimeBucket::first_in(&session, granularity),
            open: HashMap::new(),
        }
    }

    /// Returns the granularity being aggregated to.
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Returns the bucket currently accumulating.
    #[must_use]
    pub const fn bucket(&self) -> TimeBucket {
        self.bucket
    }

    /// Returns the number of tickers with an open accumulator.
    #[must_use]
    pub fn open_tickers(&self) -> usize {
        self.open.len()
    }

    /// Processes a trade, returning the candles it completed.
    ///
    /// The returned candles all belong to buckets that closed before this
    /// trade; their order is unspecified.
    pub fn process(&mut self, trade: Trade) -> Vec<Candle> {
        let ts = trade.timestamp;
        let mut completed = Vec::new();

        if self.bucket.is_closed_by(ts) {
            completed.extend(self.flush());
            self.bucket = self.bucket.advance_for(ts, self.policy);
        }

        if self.session.is_overrun_by(ts) {
            completed.extend(self.flush());
            self.roll_session(ts);
        }

        match self.open.get_mut(&trade.ticker) {
            Some(builder) => builder.update(trade.price),
            None => {
                let builder = CandleBuilder::new(self.bucket.start, trade.price);
                self.open.insert(trade.ticker, builder);
            }
        }

        completed
    }

    /// Finishes aggregation at stream end, returning every open candle.
    #[must_use]
    pub fn finish(mut self) -> Vec<Candle> {
        self.flush()
    }

    /// Drops every open accumulator without emitting, returning how many were lost.
    pub fn discard(self) -> usize {
        self.open.len()
    }

    /// Moves to the session containing `ts` and realigns the bucket to it.
    ///
    /// The session always catches up, whatever the policy: `ts` was admitted
    /// by the filter, so it lies inside the filter's current window.
    fn roll_session(&mut self, ts: DateTime<Utc>) {
        self.session = self.session.advance_for(ts, GapPolicy::CatchUp);
        let first = TimeBucket::first_in(&self.session, self.granularity);
        self.bucket = match self.policy {
            GapPolicy::SingleStep => first,
            GapPolicy::CatchUp => first.advance_for(ts, self.policy),
        };
    }

    /// Converts every open accumulator into a candle and clears them.
    fn flush(&mut self) -> Vec<Candle> {
        let granularity = self.granularity;
        self.open
            .drain()
            .map(|(ticker, builder)| builder.finish(ticker, granularity))
            .collect()
    }
}

/// Open OHLC accumulator for one ticker in one bucket.
#[derive(Debug)]
struct CandleBuilder {
    bucket_start: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    trade_count: u32,
}

impl CandleBuilder {
    /// Creates a builder from the bucket's first trade.
    const fn new(bucket_start: DateTime<Utc>, price: f64) -> Self {
        Self {
            bucket_start,
            open: price,
            high: price,
            low: price,
            close: price,
            trade_count: 1,
        }
    }

    /// Folds another trade into the builder.
    fn update(&mut self, price: f64) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        self.trade_count += 1;
    }

    /// Finishes building and returns the candle.
    fn finish(self, ticker: String, granularity: Granularity) -> Candle {
        Candle {
            ticker,
            granularity,
            bucket_start: self.bucket_start,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            trade_count: self.trade_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use candlewick_types::SessionConfig;
    use chrono::{NaiveDate, TimeZone};
    use std::collections::HashSet;

    fn at(day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, minute, second).unwrap()
    }

    fn trade(ticker: &str, day: u32, hms: (u32, u32, u32), price: f64) -> Trade {
        Trade::new(ticker, price, at(day, hms.0, hms.1, hms.2))
    }

    fn aggregator(granularity: Granularity, policy: GapPolicy) -> CandleAggregator {
        let session =
            SessionConfig::default().window_for(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        CandleAggregator::new(granularity, session, policy)
    }

    fn run(agg: &mut CandleAggregator, trades: Vec<Trade>) -> Vec<Candle> {
        trades.into_iter().flat_map(|t| agg.process(t)).collect()
    }

    #[test]
    fn test_five_minute_example() {
        let mut agg = aggregator(Granularity::MINUTE_5, GapPolicy::CatchUp);

        let emitted = run(
            &mut agg,
            vec![
                trade("AAPL", 15, (7, 0, 1), 100.0),
                trade("AAPL", 15, (7, 2, 0), 105.0),
                trade("AAPL", 15, (7, 4, 59), 102.0),
            ],
        );
        assert!(emitted.is_empty());

        let closed = agg.process(trade("AAPL", 15, (7, 5, 1), 110.0));
        assert_eq!(closed.len(), 1);
        let first = &closed[0];
        assert_eq!(first.ticker, "AAPL");
        assert_eq!(first.bucket_start, at(15, 7, 0, 0));
        assert_relative_eq!(first.open, 100.0);
        assert_relative_eq!(first.high, 105.0);
        assert_relative_eq!(first.low, 100.0);
        assert_relative_eq!(first.close, 102.0);
        assert_eq!(first.trade_count, 3);

        let rest = agg.finish();
        assert_eq!(rest.len(), 1);
        let second = &rest[0];
        assert_eq!(second.bucket_start, at(15, 7, 5, 0));
        assert_relative_eq!(second.open, 110.0);
        assert_relative_eq!(second.high, 110.0);
        assert_relative_eq!(second.low, 110.0);
        assert_relative_eq!(second.close, 110.0);
    }

    #[test]
    fn test_trade_on_bucket_end_stays_in_bucket() {
        let mut agg = aggregator(Granularity::MINUTE_5, GapPolicy::CatchUp);
        assert!(agg.process(trade("AAPL", 15, (7, 1, 0), 1.0)).is_empty());
        assert!(agg.process(trade("AAPL", 15, (7, 5, 0), 2.0)).is_empty());

        let candles = agg.finish();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].trade_count, 2);
    }

    #[test]
    fn test_flush_emits_every_ticker_once() {
        let mut agg = aggregator(Granularity::MINUTE_5, GapPolicy::CatchUp);
        run(
            &mut agg,
            vec![
                trade("AAPL", 15, (7, 1, 0), 100.0),
                trade("MSFT", 15, (7, 1, 30), 300.0),
                trade("AAPL", 15, (7, 2, 0), 99.0),
                trade("GOOG", 15, (7, 3, 0), 140.0),
            ],
        );
        assert_eq!(agg.open_tickers(), 3);

        let closed = agg.process(trade("MSFT", 15, (7, 6, 0), 301.0));
        let tickers: HashSet<_> = closed.iter().map(|c| c.ticker.as_str()).collect();
        assert_eq!(closed.len(), 3);
        assert_eq!(tickers, HashSet::from(["AAPL", "MSFT", "GOOG"]));
        assert!(closed.iter().all(Candle::is_consistent));

        // Only the ticker that traded in the new bucket is open now.
        assert_eq!(agg.open_tickers(), 1);
        let rest = agg.finish();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].ticker, "MSFT");
    }

    #[test]
    fn test_zero_price_candle_is_kept() {
        let mut agg = aggregator(Granularity::MINUTE_5, GapPolicy::CatchUp);
        agg.process(trade("ZERO", 15, (7, 1, 0), 0.0));
        agg.process(trade("ZERO", 15, (7, 2, 0), 0.0));

        let candles = agg.finish();
        assert_eq!(candles.len(), 1);
        assert_relative_eq!(candles[0].open, 0.0);
        assert_eq!(candles[0].trade_count, 2);
    }

    #[test]
    fn test_gap_skips_empty_buckets() {
        let mut agg = aggregator(Granularity::MINUTE_5, GapPolicy::CatchUp);
        agg.process(trade("AAPL", 15, (7, 1, 0), 1.0));

        let closed = agg.process(trade("AAPL", 15, (7, 17, 0), 2.0));
        assert_eq!(closed.len(), 1);
        assert_eq!(agg.bucket().start, at(15, 7, 15, 0));

        let rest = agg.finish();
        assert_eq!(rest[0].bucket_start, at(15, 7, 15, 0));
    }

    #[test]
    fn test_single_step_gap_advances_once() {
        let mut agg = aggregator(Granularity::MINUTE_5, GapPolicy::SingleStep);
        agg.process(trade("AAPL", 15, (7, 1, 0), 1.0));
        agg.process(trade("AAPL", 15, (7, 17, 0), 2.0));
        assert_eq!(agg.bucket().start, at(15, 7, 5, 0));
    }

    #[test]
    fn test_single_step_session_follows_admitted_trade() {
        let mut agg = aggregator(Granularity::MINUTE_240, GapPolicy::SingleStep);
        agg.process(trade("AAPL", 15, (8, 0, 0), 1.0));

        let closed = agg.process(trade("AAPL", 18, (8, 0, 0), 2.0));
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].bucket_start, at(15, 7, 0, 0));
        assert_eq!(agg.bucket().start, at(18, 7, 0, 0));

        assert!(agg.process(trade("AAPL", 18, (8, 1, 0), 3.0)).is_empty());
        let rest = agg.finish();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].bucket_start, at(18, 7, 0, 0));
        assert_eq!(rest[0].trade_count, 2);
    }

    #[test]
    fn test_session_rollover_flushes_and_realigns() {
        let mut agg = aggregator(Granularity::MINUTE_30, GapPolicy::CatchUp);
        agg.process(trade("AAPL", 15, (8, 10, 0), 1.0));
        agg.process(trade("MSFT", 16, (2, 50, 0), 2.0));

        let closed = agg.process(trade("AAPL", 16, (7, 40, 0), 3.0));
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].ticker, "MSFT");
        assert_eq!(closed[0].bucket_start, at(16, 2, 30, 0));
        assert_eq!(agg.bucket().start, at(16, 7, 30, 0));

        let rest = agg.finish();
        assert_eq!(rest[0].bucket_start, at(16, 7, 30, 0));
    }

    #[test]
    fn test_no_duplicate_buckets() {
        let mut agg = aggregator(Granularity::MINUTE_5, GapPolicy::CatchUp);
        let mut candles = Vec::new();
        for minute in 0..60 {
            for ticker in ["AAPL", "MSFT"] {
                let t = trade(ticker, 15, (7 + minute / 30, minute % 30 * 2, 1), f64::from(minute));
                candles.extend(agg.process(t));
            }
        }
        candles.extend(agg.finish());

        let keys: HashSet<_> = candles
            .iter()
            .map(|c| (c.ticker.clone(), c.bucket_start))
            .collect();
        assert_eq!(keys.len(), candles.len());
        assert_eq!(candles.iter().map(|c| c.trade_count).sum::<u32>(), 120);
    }

    #[test]
    fn test_discard_drops_open_candles() {
        let mut agg = aggregator(Granularity::MINUTE_240, GapPolicy::CatchUp);
        agg.process(trade("AAPL", 15, (7, 1, 0), 1.0));
        agg.process(trade("MSFT", 15, (7, 2, 0), 2.0));
        assert_eq!(agg.discard(), 2);
    }
}
