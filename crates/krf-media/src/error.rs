//! Error types for krf-media.

use std::io;
use thiserror::Error;

/// Result type for krf-media operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for krf-media operations.
///
/// Every parse-time variant aborts opening a container. Packet-level variants
/// abort only the read that produced them. [`Error::EndOfStream`] is the
/// normal termination signal of the packet reader.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream does not start with the `krf` signature.
    #[error("Not a KRF stream: magic {0:02x?}")]
    InvalidMagic([u8; 3]),

    /// Fewer bytes available than a field declares.
    #[error("Truncated input while reading {context}: need {need} bytes, have {have}")]
    TruncatedInput {
        context: &'static str,
        need: u64,
        have: u64,
    },

    /// Table record size disagrees with its element count.
    #[error("Malformed table: declared size {size} does not match {count} elements")]
    MalformedTable { size: u32, count: u32 },

    /// No `FF FF` frame marker within the scan bound.
    #[error("Sync marker not found within {scanned} bytes of offset {start}")]
    SyncNotFound { start: u64, scanned: u64 },

    /// Frame header references neither known track.
    #[error("Unknown track id {track_id} at offset {offset}")]
    UnknownTrack { track_id: u16, offset: u64 },

    /// Frame index beyond the track's index tables.
    #[error("Frame index {index} out of range (track has {len} frames)")]
    IndexOutOfRange { index: u32, len: usize },

    /// Frame payload shorter than the index declares.
    #[error("Truncated frame {index}: expected {expected} payload bytes, found {found}")]
    TruncatedFrame {
        index: u32,
        expected: u64,
        found: u64,
    },

    /// Seek target lies beyond the last indexed timestamp.
    #[error("Seek target {target} beyond last indexed timestamp {last}")]
    SeekOutOfRange { target: i64, last: i64 },

    /// Seek requested on a track without keyframes.
    #[error("Video track has no keyframes")]
    NoKeyframes,

    /// Index tables violate ordering or subset rules.
    #[error("Invalid index: {0}")]
    InvalidIndex(String),

    /// Encrypted container rejected by configuration.
    #[error("Encrypted container (encrypt type {0:#x})")]
    Encrypted(u32),

    /// Configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// No more packets.
    #[error("End of stream")]
    EndOfStream,
}

impl Error {
    /// Create an invalid index error.
    pub fn invalid_index(msg: impl Into<String>) -> Self {
        Self::InvalidIndex(msg.into())
    }

    /// Whether this is the normal end-of-stream signal rather than a failure.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_of_stream_is_distinguishable() {
        assert!(Error::EndOfStream.is_end_of_stream());
        assert!(!Error::NoKeyframes.is_end_of_stream());
        assert!(!Error::SeekOutOfRange { target: 10, last: 5 }.is_end_of_stream());
    }

    #[test]
    fn test_error_messages() {
        let err = Error::TruncatedInput {
            context: "table items",
            need: 40,
            have: 16,
        };
        assert_eq!(
            err.to_string(),
            "Truncated input while reading table items: need 40 bytes, have 16"
        );
        assert_eq!(
            Error::InvalidMagic(*b"RIF").to_string(),
            "Not a KRF stream: magic [52, 49, 46]"
        );
    }
}
