//! Decode error taxonomy
//!
//! Stream-integrity violations are always surfaced to the caller: the formats
//! carry no resynchronization markers, so skipping a bad event would
//! desynchronize every subsequent event boundary.

use thiserror::Error;

/// Errors produced while decoding an event stream
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Event header failed the sync check. Fatal: there is no way to find
    /// the next event boundary.
    #[error("malformed stream at offset {offset}: header word {word:#010x} failed sync check")]
    MalformedStream { offset: u64, word: u32 },

    /// The stream ended in the middle of an event. A clean end at an event
    /// boundary is reported as "no more events" instead, never as an error.
    #[error("truncated event at offset {offset}: stream ended mid-event")]
    TruncatedEvent { offset: u64 },

    /// A ZLE data run would write past the configured record length
    #[error(
        "ZLE overflow: run of {run_samples} samples at position {cursor} exceeds record length {record_length}"
    )]
    ZleOverflow {
        cursor: usize,
        run_samples: usize,
        record_length: usize,
    },

    /// Embedded text header carries an invalid length word
    #[error("malformed file header: length word {word:#010x} lacks the 0xB tag")]
    MalformedHeader { word: u32 },

    /// I/O error from the underlying stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using DecodeError
pub type DecodeResult<T> = Result<T, DecodeError>;
