//! Streaming trade reader.

use std::path::{Path, PathBuf};

use candlewick_types::{Trade, TradeParseError};
use csv_async::{AsyncReader, AsyncReaderBuilder, StringRecord};
use futures::stream::{self, BoxStream, StreamExt};
use thiserror::Error;
use tokio::io::AsyncRead;

use crate::parse_trade;

/// Boxed stream of trades, one item per input row.
pub type TradeStream = BoxStream<'static, Result<Trade, SourceError>>;

/// Errors that can occur while reading trades.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The input file could not be opened.
    #[error("Unable to open {path}: {source}")]
    Open {
        /// The path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The CSV framing of a row is broken, or reading failed.
    #[error("Unable to read row {row}: {source}")]
    Read {
        /// One-based row number.
        row: u64,
        /// Underlying CSV error.
        source: csv_async::Error,
    },

    /// A row was read but its fields are malformed.
    #[error("Malformed row {row}: {source}")]
    Parse {
        /// One-based row number.
        row: u64,
        /// Field-level failure.
        source: TradeParseError,
    },
}

impl SourceError {
    /// Returns true if the stream can continue past this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Open { .. } => false,
            Self::Read { source, .. } => !source.is_io_error(),
            Self::Parse { .. } => true,
        }
    }
}

/// Async CSV reader producing [`Trade`]s.
pub struct TradeReader<R> {
    reader: AsyncReader<R>,
}

impl<R> std::fmt::Debug for TradeReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeReader").finish_non_exhaustive()
    }
}

impl TradeReader<tokio::fs::File> {
    /// Opens a trade file.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Open`] if the file cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|source| SourceError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_reader(file))
    }
}

impl<R> TradeReader<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    /// Wraps an arbitrary async byte source. Rows have no header and may carry
    /// extra columns.
    pub fn from_reader(rdr: R) -> Self {
        let reader = AsyncReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .create_reader(rdr);
        Self { reader }
    }

    /// Converts the reader into a stream of parsed trades.
    ///
    /// Each malformed row yields an error item; the stream ends at EOF or
    /// after the first unrecoverable I/O error.
    pub fn into_stream(self) -> TradeStream {
        let state = ReadState {
            reader: self.reader,
            record: StringRecord::new(),
            row: 0,
            done: false,
        };

        stream::unfold(state, |mut state| async move {
            if state.done {
                return None;
            }
            state.row += 1;
            let row = state.row;
            match state.reader.read_record(&mut state.record).await {
                Ok(false) => None,
                Ok(true) => {
                    let item = parse_trade(&state.record)
                        .map_err(|source| SourceError::Parse { row, source });
                    Some((item, state))
                }
                Err(source) => {
                    let err = SourceError::Read { row, source };
                    state.done = !err.is_recoverable();
                    Some((Err(err), state))
                }
            }
        })
        .boxed()
    }
}

struct ReadState<R> {
    reader: AsyncReader<R>,
    record: StringRecord,
    row: u64,
    done: bool,
}
