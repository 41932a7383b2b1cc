//! RAWTRIG-RS: Event decoder for CAEN V1720-class waveform digitizers
//!
//! This crate reconstructs per-trigger event records from the binary files
//! written by the custom control GUI ("raw CAEN" dialect) and by CAEN's
//! WaveDump utility.

pub mod common;
pub mod config;
pub mod decoder;
pub mod header;
pub mod session;

// Re-exports
pub use common::{DecodeError, Trace, Trigger, MISSING_SAMPLE};
pub use config::{DaqVariant, SessionConfig};
pub use header::FileHeader;
pub use session::{Session, SessionError};
