//! Candle sinks.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use candlewick_aggregate::Candle;
use candlewick_types::Granularity;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::{CsvFormatter, FormatError, Formatter};

/// Errors that can occur while persisting candles.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The output file could not be created.
    #[error("Unable to create {path}: {source}")]
    Create {
        /// The output path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Writing or flushing failed.
    #[error("Write error: {0}")]
    Write(#[from] std::io::Error),

    /// Rendering the candle failed.
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Destination for completed candles of one granularity.
///
/// A sink is driven by a single worker: `write` is called once per candle in
/// emission order, then `finish` once when the stream ends or is cancelled.
#[async_trait]
pub trait CandleSink: Send {
    /// Persists one candle.
    ///
    /// # Errors
    ///
    /// Returns an error if the candle could not be written. The caller may
    /// keep writing subsequent candles.
    async fn write(&mut self, candle: &Candle) -> Result<(), SinkError>;

    /// Flushes buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    async fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

#[async_trait]
impl<S: CandleSink + ?Sized> CandleSink for Box<S> {
    async fn write(&mut self, candle: &Candle) -> Result<(), SinkError> {
        (**self).write(candle).await
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        (**self).finish().await
    }
}

/// Returns the conventional output file name for a granularity, e.g. `candles_5m.csv`.
#[must_use]
pub fn default_file_name(granularity: Granularity, extension: &str) -> String {
    format!("candles_{granularity}.{extension}")
}

/// Writes candles to a file, one formatted row per candle.
#[derive(Debug)]
pub struct CsvFileSink<F = CsvFormatter> {
    path: PathBuf,
    writer: BufWriter<File>,
    formatter: F,
    line: Vec<u8>,
}

impl CsvFileSink<CsvFormatter> {
    /// Creates (or truncates) `path` using the default CSV format.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        Self::with_formatter(path, CsvFormatter::new()).await
    }

    /// Creates `candles_<g>.csv` inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub async fn create_in(dir: impl AsRef<Path>, granularity: Granularity) -> Result<Self, SinkError> {
        Self::in_dir(dir, granularity, CsvFormatter::new()).await
    }
}

impl<F: Formatter> CsvFileSink<F> {
    /// Creates (or truncates) `path` using a custom formatter.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or the header cannot be written.
    pub async fn with_formatter(path: impl AsRef<Path>, formatter: F) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)
            .await
            .map_err(|source| SinkError::Create {
                path: path.clone(),
                source,
            })?;

        let mut sink = Self {
            path,
            writer: BufWriter::new(file),
            formatter,
            line: Vec::with_capacity(128),
        };

        sink.formatter.write_header(&mut sink.line)?;
        if !sink.line.is_empty() {
            sink.writer.write_all(&sink.line).await?;
        }
        Ok(sink)
    }

    /// Creates the conventional file for `granularity` inside `dir`, named
    /// with the formatter's extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or the header cannot be written.
    pub async fn in_dir(
        dir: impl AsRef<Path>,
        granularity: Granularity,
        formatter: F,
    ) -> Result<Self, SinkError> {
        let path = dir
            .as_ref()
            .join(default_file_name(granularity, formatter.extension()));
        Self::with_formatter(path, formatter).await
    }

    /// Returns the output path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl<F: Formatter> CandleSink for CsvFileSink<F> {
    async fn write(&mut self, candle: &Candle) -> Result<(), SinkError> {
        self.line.clear();
        self.formatter.write_candle(candle, &mut self.line)?;
        self.writer.write_all(&self.line).await?;
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush().await?;
        Ok(())
    }
}

/// Collects candles in memory.
///
/// Clones share the same buffer, so a clone kept by the caller observes
/// everything written through the one handed to the pipeline.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    candles: Arc<Mutex<Vec<Candle>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every candle written so far, in write order.
    #[must_use]
    pub fn candles(&self) -> Vec<Candle> {
        self.candles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CandleSink for MemorySink {
    async fn write(&mut self, candle: &Candle) -> Result<(), SinkError> {
        self.candles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(candle.clone());
        Ok(())
    }
}
