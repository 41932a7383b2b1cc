//! Per-event decoders for digitizer raw data
//!
//! Converts the binary event stream into structured [`Trigger`] records.
//! Each DAQ variant has its own decoder; they share the bitfield, ZLE and
//! time-tag helpers.
//!
//! [`Trigger`]: crate::common::Trigger

pub mod bitfield;
pub mod raw_caen;
pub mod timetag;
pub mod wave_dump;
pub mod zle;

pub use timetag::TimeTagTracker;

use crate::common::DecodeError;
use std::io::{ErrorKind, Read};

/// Read one 32-bit little-endian word
pub(crate) fn read_u32<R: Read>(reader: &mut R) -> std::io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read `count` unsigned 16-bit little-endian samples
pub(crate) fn read_samples<R: Read>(reader: &mut R, count: usize) -> std::io::Result<Vec<u16>> {
    let mut bytes = vec![0u8; count * 2];
    reader.read_exact(&mut bytes)?;
    Ok(bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect())
}

/// Fill `buf` from the stream, distinguishing a clean end of stream at an
/// event boundary (returns `Ok(false)`) from a mid-header truncation
/// (returns `ErrorKind::UnexpectedEof`).
pub(crate) fn read_at_boundary<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                if filled == 0 {
                    return Ok(false);
                }
                return Err(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "stream ended inside an event header",
                ));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

/// Map an I/O error inside an event body to the decode taxonomy: a short
/// read mid-event is a truncation, anything else passes through.
pub(crate) fn truncated(err: std::io::Error, offset: u64) -> DecodeError {
    if err.kind() == ErrorKind::UnexpectedEof {
        DecodeError::TruncatedEvent { offset }
    } else {
        DecodeError::Io(err)
    }
}
