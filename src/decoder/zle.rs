//! Zero-length-encoding (ZLE) trace decompression
//!
//! A ZLE trace starts with one size word giving the total number of 32-bit
//! control+data words in the trace (itself included). Each control word
//! carries a run length in samples-pairs (low 21 bits) and a data flag in
//! bit 31: data runs are followed by their samples inline, skip runs only
//! advance the sample cursor. Skipped positions keep the missing-sample
//! marker so that sample index always equals sample-clock position.

use std::io::Read;

use super::{read_samples, read_u32, truncated};
use crate::common::{DecodeError, DecodeResult, MISSING_SAMPLE};

/// Run length field of a control word, in units of two samples
pub const RUN_LENGTH_MASK: u32 = 0x001F_FFFF;
/// Control word bit 31: set for a data run, clear for a skip run
pub const DATA_FLAG: u32 = 0x8000_0000;

/// Decompress one channel's ZLE trace into a fixed-length sample buffer.
///
/// `offset` is the event's file position, used for error reporting only.
pub fn decode_trace<R: Read>(
    reader: &mut R,
    record_length: usize,
    offset: u64,
) -> DecodeResult<Vec<u16>> {
    let tr_size = u64::from(read_u32(reader).map_err(|e| truncated(e, offset))?);
    let mut samples = vec![MISSING_SAMPLE; record_length];
    let mut cursor = 0usize;
    // The size word counts toward tr_size.
    let mut consumed = 1u64;
    while consumed < tr_size {
        let control = read_u32(reader).map_err(|e| truncated(e, offset))?;
        let run = (control & RUN_LENGTH_MASK) as usize * 2;
        if control & DATA_FLAG != 0 {
            if cursor + run > samples.len() {
                return Err(DecodeError::ZleOverflow {
                    cursor,
                    run_samples: run,
                    record_length,
                });
            }
            let data = read_samples(reader, run).map_err(|e| truncated(e, offset))?;
            samples[cursor..cursor + run].copy_from_slice(&data);
            consumed += 1 + run as u64 / 2;
        } else {
            consumed += 1;
        }
        cursor += run;
    }
    Ok(samples)
}
