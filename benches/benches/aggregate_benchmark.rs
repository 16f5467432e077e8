//! Aggregation benchmarks.
//!
//! Run with: `cargo bench --package candlewick-bench`

use candlewick_lib::{
    CandleAggregator, CandleSink, GapPolicy, Granularity, MemorySink, Pipeline, PipelineConfig,
    SessionConfig, SessionFilter, Trade,
};
use chrono::{NaiveDate, TimeDelta};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use futures::stream;
use std::hint::black_box;

const TICKERS: [&str; 8] = ["AAPL", "MSFT", "GOOG", "AMZN", "META", "NVDA", "TSLA", "NFLX"];

/// Synthetic trades spread evenly over one session, plus a few outside it.
fn synthetic_trades(count: u32) -> Vec<Trade> {
    let session = SessionConfig::default().window_for(trading_day());
    let spacing_ms = (session.length().num_milliseconds() / i64::from(count)).max(1);
    (0..count)
        .map(|i| {
            let ticker = TICKERS[i as usize % TICKERS.len()];
            let price = 100.0 + f64::from(i % 997) * 0.01;
            let ts = session.start + TimeDelta::milliseconds(i64::from(i) * spacing_ms + 1);
            Trade::new(ticker, price, ts)
        })
        .collect()
}

fn trading_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default()
}

fn aggregator_benchmark(c: &mut Criterion) {
    let trades = synthetic_trades(100_000);
    let session = SessionConfig::default().window_for(trading_day());

    let mut group = c.benchmark_group("aggregator");
    group.throughput(Throughput::Elements(trades.len() as u64));
    for granularity in Granularity::STANDARD {
        group.bench_with_input(
            BenchmarkId::from_parameter(granularity),
            &trades,
            |b, trades| {
                b.iter(|| {
                    let mut aggregator =
                        CandleAggregator::new(granularity, session, GapPolicy::CatchUp);
                    let mut emitted = 0usize;
                    for trade in trades {
                        emitted += aggregator.process(trade.clone()).len();
                    }
                    emitted += aggregator.finish().len();
                    black_box(emitted)
                });
            },
        );
    }
    group.finish();
}

fn filter_benchmark(c: &mut Criterion) {
    let trades = synthetic_trades(100_000);
    let session = SessionConfig::default().window_for(trading_day());

    let mut group = c.benchmark_group("session_filter");
    group.throughput(Throughput::Elements(trades.len() as u64));
    group.bench_function("admit", |b| {
        b.iter(|| {
            let mut filter = SessionFilter::new(session, GapPolicy::CatchUp);
            trades
                .iter()
                .filter(|trade| filter.admit(trade.timestamp))
                .count()
        });
    });
    group.finish();
}

fn pipeline_benchmark(c: &mut Criterion) {
    let trades = synthetic_trades(20_000);
    let Ok(runtime) = tokio::runtime::Runtime::new() else {
        return;
    };

    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Elements(trades.len() as u64));
    group.sample_size(20);
    group.bench_function("standard_granularities", |b| {
        b.to_async(&runtime).iter(|| async {
            let config = PipelineConfig {
                deadline: None,
                ..PipelineConfig::default()
            };
            let sinks: Vec<Box<dyn CandleSink>> = config
                .granularities
                .iter()
                .map(|_| Box::new(MemorySink::new()) as Box<dyn CandleSink>)
                .collect();
            let source = stream::iter(trades.clone().into_iter().map(Ok));
            let report = match Pipeline::new(config) {
                Ok(pipeline) => pipeline.run(source, sinks).await.ok(),
                Err(_) => None,
            };
            black_box(report)
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    aggregator_benchmark,
    filter_benchmark,
    pipeline_benchmark
);
criterion_main!(benches);
