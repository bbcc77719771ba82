//! Elementary units produced by the demuxer.

use crate::krf::TrackKind;
use bytes::Bytes;

/// One demuxed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Output stream index (video 0, audio 1).
    pub stream_index: usize,
    pub kind: TrackKind,
    /// Presentation timestamp in milliseconds, relative to the first video
    /// frame. Audio shares the same origin.
    pub pts: i64,
    /// Decode timestamp; always equal to `pts`.
    pub dts: i64,
    pub is_keyframe: bool,
    /// Frame index within its track.
    pub frame_index: u32,
    /// File offset of the frame record, as listed in the index.
    pub frame_offset: u32,
    /// Frame record size from the index, including the 8-byte header.
    pub frame_size: u32,
    /// Stream position of the first payload byte.
    pub pos: u64,
    /// Payload bytes.
    pub data: Bytes,
}

impl Packet {
    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_video(&self) -> bool {
        self.kind.is_video()
    }
}
