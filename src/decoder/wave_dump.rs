//! Event decoder for the WaveDump dialect
//!
//! WaveDump writes one channel per file. Each event is a 6-word header
//! followed by raw 16-bit samples; there is no channel bitmask and no ZLE.
//! Word 0 holds the event size in bytes, header included.

use std::io::Read;

use tracing::trace;

use super::timetag::{absolute_time, TimeTagTracker};
use super::{read_at_boundary, read_samples, truncated};
use crate::common::{DecodeError, DecodeResult, Trace, Trigger};
use crate::header::FileHeader;

/// WaveDump event header length in bytes (6 words)
pub const HEADER_BYTES: usize = 24;

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
    let mut words = [0u32; 6];
    for (i, chunk) in head.chunks_exact(4).enumerate() {
        words[i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    let event_bytes = words[0] as usize;
    if event_bytes < HEADER_BYTES {
        return Err(DecodeError::MalformedStream {
            offset: position,
            word: words[0],
        });
    }
    let sample_count = (event_bytes - HEADER_BYTES) / 2;
    let board_id = words[1] as u8;
    let pattern = words[2];
    let channel = words[3] as u8;
    let event_counter = words[4];

    let ticks = tracker.correct(words[5]);
    let trigger_time = absolute_time(header.start_epoch, ticks, tick_seconds);

    let samples = read_samples(reader, sample_count).map_err(|e| truncated(e, position))?;

    trace!(
        counter = event_counter,
        board = board_id,
        channel,
        samples = sample_count,
        "decoded event"
    );

    Ok(Some(Trigger {
        file_position: position,
        event_counter,
        board_id,
        pattern,
        raw_time_tag: ticks,
        trigger_time,
        traces: vec![Trace::new(board_id, channel, samples)],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DaqVariant;
    use std::io::Cursor;

    fn push_u32(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn push_u16(buf: &mut Vec<u8>, v: u16) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn test_header() -> FileHeader {
        FileHeader {
            record_length: 0,
            start_epoch: 1_500_000_000.0,
            channel_count: 1,
            variant: DaqVariant::WaveDump,
            series: Some(1),
            file_number: Some(0),
            used_fallback: false,
        }
    }

    fn make_event(board: u32, pattern: u32, channel: u32, counter: u32, tag: u32, samples: &[u16]) -> Vec<u8> {
        let mut buf = Vec::new();
        push_u32(&mut buf, (HEADER_BYTES + samples.len() * 2) as u32);
        push_u32(&mut buf, board);
        push_u32(&mut buf, pattern);
        push_u32(&mut buf, channel);
        push_u32(&mut buf, counter);
        push_u32(&mut buf, tag);
        for &s in samples {
            push_u16(&mut buf, s);
        }
        buf
    }

    #[test]
    fn single_channel_event() {
        let samples: Vec<u16> = (0..100).collect();
        let bytes = make_event(2, 0x100, 5, 42, 1000, &samples);
        let mut cursor = Cursor::new(bytes);
        let mut tracker = TimeTagTracker::new();
        let trigger = decode_event(&mut cursor, 0, &test_header(), 8e-9, &mut tracker)
            .unwrap()
            .unwrap();

        assert_eq!(trigger.event_counter, 42);
        assert_eq!(trigger.board_id, 2);
        assert_eq!(trigger.pattern, 0x100);
        assert_eq!(trigger.raw_time_tag, 1000);
        assert_eq!(trigger.traces.len(), 1);
        assert_eq!(trigger.traces[0].name, "b2tr5");
        assert_eq!(trigger.traces[0].samples, samples);
        assert!((trigger.trigger_time - (1_500_000_000.0 + 1000.0 * 8e-9)).abs() < 1e-6);
    }

    #[test]
    fn clean_eof_returns_none() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        let mut tracker = TimeTagTracker::new();
        assert!(
            decode_event(&mut cursor, 0, &test_header(), 8e-9, &mut tracker)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn partial_header_is_truncated() {
        let mut cursor = Cursor::new(vec![0u8; 10]);
        let mut tracker = TimeTagTracker::new();
        assert!(matches!(
            decode_event(&mut cursor, 0, &test_header(), 8e-9, &mut tracker),
            Err(DecodeError::TruncatedEvent { .. })
        ));
    }

    #[test]
    fn partial_samples_is_truncated() {
        let samples: Vec<u16> = (0..10).collect();
        let mut bytes = make_event(0, 0, 0, 1, 0, &samples);
        bytes.truncate(bytes.len() - 3);
        let mut cursor = Cursor::new(bytes);
        let mut tracker = TimeTagTracker::new();
        assert!(matches!(
            decode_event(&mut cursor, 0, &test_header(), 8e-9, &mut tracker),
            Err(DecodeError::TruncatedEvent { .. })
        ));
    }

    #[test]
    fn undersized_size_word_is_malformed() {
        let mut bytes = Vec::new();
        push_u32(&mut bytes, 10); // smaller than the header itself
        bytes.extend_from_slice(&[0u8; 20]);
        let mut cursor = Cursor::new(bytes);
        let mut tracker = TimeTagTracker::new();
        assert!(matches!(
            decode_event(&mut cursor, 0, &test_header(), 8e-9, &mut tracker),
            Err(DecodeError::MalformedStream { .. })
        ));
    }

    #[test]
    fn rollover_spans_events() {
        let mut bytes = make_event(0, 0, 0, 1, 2_100_000_000, &[]);
        bytes.extend(make_event(0, 0, 0, 2, 5, &[]));
        let mut cursor = Cursor::new(bytes);
        let mut tracker = TimeTagTracker::new();
        let header = test_header();
        decode_event(&mut cursor, 0, &header, 8e-9, &mut tracker)
            .unwrap()
            .unwrap();
        let second = decode_event(&mut cursor, 24, &header, 8e-9, &mut tracker)
            .unwrap()
            .unwrap();
        assert_eq!(second.raw_time_tag, 5 + (1u64 << 31));
    }
}
