//! Stream descriptors exposed to the consumer.

use crate::krf::{AudioParams, CodecId, TrackDescriptor, TrackKind};

/// Rational time base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct TimeBase {
    pub num: u32,
    pub den: u32,
}

impl TimeBase {
    /// Milliseconds, the only time base KRF uses.
    pub const MILLIS: Self = Self { num: 1, den: 1000 };

    /// Convert a tick count in this time base to seconds.
    pub fn to_secs(&self, ticks: i64) -> f64 {
        if self.den == 0 {
            0.0
        } else {
            ticks as f64 * self.num as f64 / self.den as f64
        }
    }
}

/// One output stream.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct StreamDescriptor {
    /// Stream index (video 0, audio 1).
    pub index: usize,
    pub kind: TrackKind,
    pub codec: CodecId,
    /// Track id used in frame headers.
    pub track_id: u16,
    pub time_base: TimeBase,
    /// Always 0; timestamps are rebased to the video origin.
    pub start_time: i64,
    /// Duration in `time_base` units.
    pub duration: i64,
    /// Audio parameters (audio stream only).
    pub audio: Option<AudioParams>,
    /// Whether units need further bitstream framing by the consumer.
    pub needs_parsing: bool,
}

impl StreamDescriptor {
    pub(crate) fn from_track(track: &TrackDescriptor) -> Self {
        Self {
            index: track.kind.stream_index(),
            kind: track.kind,
            codec: track.codec_id(),
            track_id: track.track_id,
            time_base: TimeBase::MILLIS,
            start_time: 0,
            duration: track.duration_ms(),
            audio: track.audio_params(),
            needs_parsing: track.needs_parsing(),
        }
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.time_base.to_secs(self.duration)
    }
}
