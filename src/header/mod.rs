//! File-level header parsing
//!
//! Raw CAEN files open with one binary length word (top nibble `0xB`)
//! followed by a newline-separated text dump of the DAQ settings; the
//! decoder needs `RECORD_LENGTH` plus the operator-entered `DATE(M/D/Y)`
//! and `TIME` fields. WaveDump files have no embedded header at all, so
//! the metadata comes from the `s<series>_f<file>_ts<epoch>.dat` filename
//! convention.
//!
//! Missing or garbled operator fields are never fatal: the start epoch
//! falls back to the file creation time and the header records that the
//! fallback was used.

use std::io::Read;
use std::path::Path;
use std::time::UNIX_EPOCH;

use chrono::{NaiveDate, NaiveTime};
use tracing::warn;

use crate::common::{DecodeError, DecodeResult};
use crate::config::{DaqVariant, SessionConfig};
use crate::decoder;

/// Top nibble of the raw CAEN header length word
const HEADER_TAG: u32 = 0xB;
const HEADER_LEN_MASK: u32 = 0x0FFF_FFFF;

/// File-level metadata established at session open
#[derive(Debug, Clone, PartialEq)]
pub struct FileHeader {
    /// Samples per trace for ZLE reconstruction (0 when the file has no
    /// embedded header)
    pub record_length: u32,
    /// Acquisition start time, seconds since the Unix epoch
    pub start_epoch: f64,
    /// Channel cardinality used to bound the bitmask scan
    pub channel_count: u32,
    /// DAQ dialect the file was written by
    pub variant: DaqVariant,
    /// Run series number from the WaveDump filename convention
    pub series: Option<u32>,
    /// File sequence number from the WaveDump filename convention
    pub file_number: Option<u32>,
    /// True when the start epoch came from file metadata instead of the
    /// header or filename
    pub used_fallback: bool,
}

/// Parse the embedded text header of a raw CAEN file. Leaves the reader
/// positioned at the first event.
pub fn read_caen_header<R: Read>(
    reader: &mut R,
    config: &SessionConfig,
    fallback_epoch: f64,
) -> DecodeResult<FileHeader> {
    let word = decoder::read_u32(reader).map_err(|e| decoder::truncated(e, 0))?;
    if word >> 28 != HEADER_TAG {
        return Err(DecodeError::MalformedHeader { word });
    }
    let header_words = word & HEADER_LEN_MASK;
    if header_words == 0 {
        return Err(DecodeError::MalformedHeader { word });
    }
    let mut text = vec![0u8; header_words as usize * 4 - 4];
    reader
        .read_exact(&mut text)
        .map_err(|e| decoder::truncated(e, 0))?;
    let text = String::from_utf8_lossy(&text);

    let mut record_length = 0u32;
    let mut date = None;
    let mut time = None;
    for line in text.lines() {
        if let Some(value) = field_value(line, "RECORD_LENGTH") {
            match value.parse() {
                Ok(v) => record_length = v,
                Err(_) => warn!(value, "unparseable RECORD_LENGTH, assuming 0"),
            }
        } else if let Some(value) = field_value(line, "DATE(M/D/Y)") {
            if let Ok(d) = NaiveDate::parse_from_str(value, "%m/%d/%Y") {
                date = Some(d);
            }
        } else if let Some(value) = field_value(line, "TIME") {
            if let Ok(t) = NaiveTime::parse_from_str(value, "%H:%M:%S") {
                time = Some(t);
            }
        }
    }

    let (start_epoch, used_fallback) = match (date, time) {
        (Some(d), Some(t)) => (d.and_time(t).and_utc().timestamp() as f64, false),
        _ => {
            warn!(
                fallback_epoch,
                "header DATE/TIME missing or unparseable, using file creation time"
            );
            (fallback_epoch, true)
        }
    };

    Ok(FileHeader {
        record_length,
        start_epoch,
        channel_count: config.channel_count,
        variant: DaqVariant::RawCaen,
        series: None,
        file_number: None,
        used_fallback,
    })
}

/// Extract the value of a named header field. The name must be the line's
/// first token, so `DEAD_TIME` never matches a lookup for `TIME`. Accepts
/// whitespace, `:` or `=` between the name and the value.
fn field_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line.trim_start().strip_prefix(name)?;
    if !rest.is_empty() && !rest.starts_with([':', '=', ' ', '\t']) {
        return None;
    }
    let rest = rest.trim_start_matches([':', '=', ' ', '\t']);
    rest.split_whitespace().next()
}

/// Build the header for a WaveDump file from its filename convention.
pub fn wavedump_header(path: &Path, config: &SessionConfig, fallback_epoch: f64) -> FileHeader {
    let parsed = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(parse_wavedump_filename);
    let (series, file_number, start_epoch, used_fallback) = match parsed {
        Some((series, file_number, epoch)) => (Some(series), Some(file_number), epoch as f64, false),
        None => {
            warn!(
                path = %path.display(),
                "filename does not match s<N>_f<N>_ts<epoch>.dat, using file creation time"
            );
            (None, None, fallback_epoch, true)
        }
    };
    FileHeader {
        record_length: 0,
        start_epoch,
        channel_count: config.channel_count,
        variant: DaqVariant::WaveDump,
        series,
        file_number,
        used_fallback,
    }
}

/// Header for a WaveDump byte stream with no filename metadata.
pub fn wavedump_stream_header(config: &SessionConfig, start_epoch: f64) -> FileHeader {
    FileHeader {
        record_length: 0,
        start_epoch,
        channel_count: config.channel_count,
        variant: DaqVariant::WaveDump,
        series: None,
        file_number: None,
        used_fallback: false,
    }
}

/// Parse `s<series>_f<file>_ts<epoch>.dat` into its three numbers.
pub fn parse_wavedump_filename(name: &str) -> Option<(u32, u32, u64)> {
    let stem = name.strip_suffix(".dat").unwrap_or(name);
    let mut parts = stem.split('_');
    let series = parts.next()?.strip_prefix('s')?.parse().ok()?;
    let file_number = parts.next()?.strip_prefix('f')?.parse().ok()?;
    let epoch = parts.next()?.strip_prefix("ts")?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((series, file_number, epoch))
}

/// File creation time (modification time where birth time is unavailable)
/// as seconds since the Unix epoch. Returns 0 when no metadata exists.
pub fn file_creation_epoch(path: &Path) -> f64 {
    let Ok(meta) = std::fs::metadata(path) else {
        return 0.0;
    };
    let stamp = meta.created().or_else(|_| meta.modified());
    match stamp {
        Ok(t) => t
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0),
        Err(_) => 0.0,
    }
}
