//! Common data types shared across the decoder and session layers

pub mod error;
pub use error::{DecodeError, DecodeResult};

/// Missing-sample marker for ZLE-decoded traces.
///
/// ZLE stores only the "interesting" runs of a trace; positions that were
/// never recorded are filled with this value so that sample index always
/// corresponds to a fixed sample-clock position. V1720-class ADCs digitize
/// at 14 bits or less, so 0xFFFF can never be a legitimate reading.
pub const MISSING_SAMPLE: u16 = 0xFFFF;

/// One channel's digitized samples within a trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    /// Channel index on the board
    pub channel: u8,
    /// Trace name following the `b<board>tr<channel>` convention
    pub name: String,
    /// Amplitude samples, one per sample-clock tick
    pub samples: Vec<u16>,
}

impl Trace {
    /// Create a named trace for a board/channel pair
    pub fn new(board_id: u8, channel: u8, samples: Vec<u16>) -> Self {
        Self {
            channel,
            name: format!("b{}tr{}", board_id, channel),
            samples,
        }
    }
}

/// One decoded trigger: event metadata plus the traces of all active channels
///
/// Immutable once constructed; the session does not retain it.
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    /// Byte offset of the event's first header word in the file
    pub file_position: u64,
    /// Hardware event counter (24-bit, masked)
    pub event_counter: u32,
    /// Board identifier (5-bit field for raw CAEN files)
    pub board_id: u8,
    /// I/O pattern word (WaveDump only, 0 for raw CAEN)
    pub pattern: u32,
    /// Rollover-corrected hardware tick count
    pub raw_time_tag: u64,
    /// Absolute trigger time in seconds (start epoch + ticks * tick period)
    pub trigger_time: f64,
    /// Traces in ascending channel order as found in the active-channel mask
    pub traces: Vec<Trace>,
}

impl Trigger {
    /// Look up a trace by name (e.g. "b0tr1")
    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.name == name)
    }

    /// Look up a trace by channel index
    pub fn trace_for_channel(&self, channel: u8) -> Option<&Trace> {
        self.traces.iter().find(|t| t.channel == channel)
    }

    /// Format trigger metadata for display
    pub fn display(&self) -> String {
        format!(
            "Pos:{:10} Cnt:{:8} B:{:2} T:{:17.9}s Tag:{:12} Traces:{}",
            self.file_position,
            self.event_counter,
            self.board_id,
            self.trigger_time,
            self.raw_time_tag,
            self.traces.len()
        )
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
