//! Decoding session over an open recording
//!
//! A session owns the byte stream, the parsed file header and the mutable
//! decode state (stream position and time-tag rollover tracking). Events
//! are pulled one at a time; the stream stays open until the session is
//! dropped or closed.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::common::{DecodeError, Trigger};
use crate::config::{DaqVariant, SessionConfig};
use crate::decoder::{raw_caen, wave_dump, TimeTagTracker};
use crate::header::{self, FileHeader};

/// Errors surfaced by session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `trigger_at` was pointed at the end of the stream
    #[error("no event at offset {0}: end of stream")]
    NoEventAt(u64),
}

/// Mutable decode state carried between events
#[derive(Debug, Clone, Default)]
struct SessionState {
    /// Byte offset of the next event to decode
    position: u64,
    /// Rollover tracker, fed by every decoded event in call order
    time_tags: TimeTagTracker,
}

/// A decoding session over one recording
pub struct Session<R> {
    reader: R,
    header: FileHeader,
    config: SessionConfig,
    state: SessionState,
}

impl Session<BufReader<File>> {
    /// Open a recording on disk. For raw CAEN files this parses the
    /// embedded text header; for WaveDump files the metadata comes from
    /// the filename convention.
    pub fn open<P: AsRef<Path>>(path: P, config: SessionConfig) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let fallback_epoch = header::file_creation_epoch(path);
        let mut reader = BufReader::new(File::open(path)?);
        let file_header = match config.variant {
            DaqVariant::RawCaen => header::read_caen_header(&mut reader, &config, fallback_epoch)?,
            DaqVariant::WaveDump => header::wavedump_header(path, &config, fallback_epoch),
        };
        Self::with_header(reader, config, file_header)
    }
}

impl<R: Read + Seek> Session<R> {
    /// Build a session over any seekable byte stream. For raw CAEN the
    /// embedded text header is parsed from the stream; `start_epoch` is
    /// the acquisition start for WaveDump streams, which carry none.
    pub fn from_reader(
        mut reader: R,
        config: SessionConfig,
        start_epoch: f64,
    ) -> Result<Self, SessionError> {
        let file_header = match config.variant {
            DaqVariant::RawCaen => header::read_caen_header(&mut reader, &config, start_epoch)?,
            DaqVariant::WaveDump => header::wavedump_stream_header(&config, start_epoch),
        };
        Self::with_header(reader, config, file_header)
    }

    fn with_header(
        mut reader: R,
        config: SessionConfig,
        file_header: FileHeader,
    ) -> Result<Self, SessionError> {
        let position = reader.stream_position()?;
        info!(
            variant = %file_header.variant,
            record_length = file_header.record_length,
            start_epoch = file_header.start_epoch,
            first_event = position,
            "session opened"
        );
        Ok(Self {
            reader,
            header: file_header,
            config,
            state: SessionState {
                position,
                time_tags: TimeTagTracker::new(),
            },
        })
    }

    /// Decode the next sequential event. Returns `Ok(None)` at a clean end
    /// of stream; the session stays open and usable afterwards.
    pub fn next_trigger(&mut self) -> Result<Option<Trigger>, SessionError> {
        let position = self.state.position;
        self.reader.seek(SeekFrom::Start(position))?;
        let trigger = self.decode_one(position)?;
        if trigger.is_some() {
            self.state.position = self.reader.stream_position()?;
        }
        Ok(trigger)
    }

    /// Decode the event starting at `position`, as previously reported in
    /// a trigger's `file_position`. Sequential iteration continues after
    /// the decoded event.
    ///
    /// The rollover tracker still sees the event's time tag, so visiting
    /// events out of acquisition order can miscount rollovers; positions
    /// should come from the current pass.
    pub fn trigger_at(&mut self, position: u64) -> Result<Trigger, SessionError> {
        self.reader.seek(SeekFrom::Start(position))?;
        match self.decode_one(position)? {
            Some(trigger) => {
                self.state.position = self.reader.stream_position()?;
                Ok(trigger)
            }
            None => Err(SessionError::NoEventAt(position)),
        }
    }

    fn decode_one(&mut self, position: u64) -> Result<Option<Trigger>, SessionError> {
        let tick_seconds = self.config.tick_seconds();
        let trigger = match self.config.variant {
            DaqVariant::RawCaen => raw_caen::decode_event(
                &mut self.reader,
                position,
                &self.header,
                tick_seconds,
                &mut self.state.time_tags,
            )?,
            DaqVariant::WaveDump => wave_dump::decode_event(
                &mut self.reader,
                position,
                &self.header,
                tick_seconds,
                &mut self.state.time_tags,
            )?,
        };
        Ok(trigger)
    }

    /// File-level metadata parsed at open
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Byte offset of the next sequential event
    pub fn position(&self) -> u64 {
        self.state.position
    }

    /// Time-tag rollovers observed so far
    pub fn rollover_count(&self) -> u64 {
        self.state.time_tags.rollover_count()
    }

    /// Close the session, releasing the underlying stream
    pub fn close(self) {}
}
