//! Event decoder for the raw CAEN dialect
//!
//! Events are back to back with no inter-event markers: a 4-word header,
//! then per-channel sample payloads for every channel set in the bitmask,
//! either fixed-length raw samples or ZLE-compressed traces.

use std::io::Read;

use tracing::trace;

use super::bitfield::{self, constants::HEADER_BYTES};
use super::timetag::{absolute_time, TimeTagTracker};
use super::{read_at_boundary, read_samples, truncated, zle};
use crate::common::{DecodeError, DecodeResult, Trace, Trigger};
use crate::header::FileHeader;

/// Decode the event starting at `position`. Returns `Ok(None)` on a clean
/// end of stream at the event boundary.
pub fn decode_event<R: Read>(
    reader: &mut R,
    position: u64,
    header: &FileHeader,
    tick_seconds: f64,
    tracker: &mut TimeTagTracker,
) -> DecodeResult<Option<Trigger>> {
    let mut head = [0u8; HEADER_BYTES];
    if !read_at_boundary(reader, &mut head).map_err(|e| truncated(e, position))? {
        return Ok(None);
    }
    let w0 = u32::from_le_bytes([head[0], head[1], head[2], head[3]]);
    let w1 = u32::from_le_bytes([head[4], head[5], head[6], head[7]]);
    let w2 = u32::from_le_bytes([head[8], head[9], head[10], head[11]]);
    let w3 = u32::from_le_bytes([head[12], head[13], head[14], head[15]]);

    if !bitfield::is_sync_word(w0) {
        return Err(DecodeError::MalformedStream {
            offset: position,
            word: w0,
        });
    }
    let event_size = bitfield::event_size_words(w0) as usize;
    if event_size < HEADER_BYTES / 4 {
        return Err(DecodeError::MalformedStream {
            offset: position,
            word: w0,
        });
    }
    let payload_bytes = event_size * 4 - HEADER_BYTES;

    let board_id = bitfield::board_id(w1);
    let zle_enabled = bitfield::zle_enabled(w1);
    let channels = bitfield::active_channels(bitfield::channel_mask(w1, w2), header.channel_count);
    let event_counter = bitfield::event_counter(w2);

    let ticks = tracker.correct(w3);
    let trigger_time = absolute_time(header.start_epoch, ticks, tick_seconds);

    let mut traces = Vec::with_capacity(channels.len());
    if channels.is_empty() {
        // Empty bitmask with a non-empty body: discard the payload so the
        // next event boundary stays aligned.
        std::io::copy(
            &mut reader.by_ref().take(payload_bytes as u64),
            &mut std::io::sink(),
        )
        .map_err(|e| truncated(e, position))?;
    } else if zle_enabled {
        for &ch in &channels {
            let samples = zle::decode_trace(reader, header.record_length as usize, position)?;
            traces.push(Trace::new(board_id, ch, samples));
        }
    } else {
        let samples_per_channel = payload_bytes / (2 * channels.len());
        for &ch in &channels {
            let samples = read_samples(reader, samples_per_channel)
                .map_err(|e| truncated(e, position))?;
            traces.push(Trace::new(board_id, ch, samples));
        }
    }

    trace!(
        counter = event_counter,
        board = board_id,
        channels = channels.len(),
        zle = zle_enabled,
        "decoded event"
    );

    Ok(Some(Trigger {
        file_position: position,
        event_counter,
        board_id,
        pattern: 0,
        raw_time_tag: ticks,
        trigger_time,
        traces,
    }))
}
