//! Track records and their frame index.
//!
//! A track record starts with a 20-byte header followed by a fixed run of
//! tables. Video carries four (timestamp, iframe offset, frame size, frame
//! offset), audio three (timestamp, frame size, frame offset). The parallel
//! tables are resolved into one [`FrameEntry`] per frame when the track is
//! parsed.

use super::codec::{AudioCodec, AudioParams, CodecId, VideoCodec};
use super::io::ByteReader;
use super::table::{read_table, Table};
use crate::{Error, Result};
use std::collections::HashSet;
use std::io::{Read, Seek};

/// Which elementary stream a track carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "lowercase"))]
pub enum TrackKind {
    Video,
    Audio,
}

impl TrackKind {
    /// Output stream index: video is 0, audio is 1.
    pub fn stream_index(&self) -> usize {
        match self {
            Self::Video => 0,
            Self::Audio => 1,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video)
    }
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// A resolved frame from the index tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct FrameEntry {
    /// Frame index (0-based).
    pub index: u32,
    /// Absolute timestamp in milliseconds.
    pub timestamp: u32,
    /// File offset of the frame's sync marker.
    pub offset: u32,
    /// Frame record size, including the 8-byte frame header.
    pub size: u32,
    /// Whether the offset appears in the keyframe table.
    pub is_keyframe: bool,
}

/// Frame index for one track.
#[derive(Debug, Clone, Default)]
pub struct TrackIndex {
    /// All resolved frames, in index order.
    pub frames: Vec<FrameEntry>,
    /// Keyframe offsets as stored (video only).
    pub keyframe_offsets: Vec<u32>,
}

impl TrackIndex {
    /// Create a new track index builder.
    pub fn builder() -> TrackIndexBuilder {
        TrackIndexBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Get frame by index.
    pub fn get(&self, index: u32) -> Option<&FrameEntry> {
        self.frames.get(index as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameEntry> {
        self.frames.iter()
    }

    /// Last indexed timestamp.
    pub fn last_timestamp(&self) -> Option<u32> {
        self.frames.last().map(|f| f.timestamp)
    }

    /// First frame whose timestamp is at or after `timestamp`.
    pub fn find_frame_at_or_after(&self, timestamp: i64) -> Option<&FrameEntry> {
        let i = self
            .frames
            .partition_point(|f| (f.timestamp as i64) < timestamp);
        self.frames.get(i)
    }

    /// Last keyframe offset at or before `offset`.
    pub fn keyframe_at_or_before(&self, offset: u32) -> Option<u32> {
        let i = self.keyframe_offsets.partition_point(|&k| k <= offset);
        i.checked_sub(1).map(|i| self.keyframe_offsets[i])
    }

    /// Resolve an absolute timestamp to the byte offset to seek to.
    ///
    /// Picks the first frame at or after `timestamp`, then the last keyframe
    /// at or before that frame. A target earlier than every keyframe resolves
    /// to the first keyframe.
    pub fn keyframe_offset_for(&self, timestamp: i64) -> Result<u32> {
        let candidate = self
            .find_frame_at_or_after(timestamp)
            .ok_or(Error::SeekOutOfRange {
                target: timestamp,
                last: self.last_timestamp().map_or(-1, i64::from),
            })?;

        let first_keyframe = *self.keyframe_offsets.first().ok_or(Error::NoKeyframes)?;
        Ok(self
            .keyframe_at_or_before(candidate.offset)
            .unwrap_or(first_keyframe))
    }

    /// Check ordering and subset rules.
    ///
    /// Frame offsets must be strictly increasing, timestamps non-decreasing,
    /// and every keyframe offset must name a frame.
    pub fn validate(&self) -> Result<()> {
        for w in self.frames.windows(2) {
            if w[1].offset <= w[0].offset {
                return Err(Error::invalid_index(format!(
                    "frame offsets not increasing at frame {}: {} after {}",
                    w[1].index, w[1].offset, w[0].offset
                )));
            }
            if w[1].timestamp < w[0].timestamp {
                return Err(Error::invalid_index(format!(
                    "timestamps decrease at frame {}: {} after {}",
                    w[1].index, w[1].timestamp, w[0].timestamp
                )));
            }
        }

        let offsets: HashSet<u32> = self.frames.iter().map(|f| f.offset).collect();
        if let Some(k) = self.keyframe_offsets.iter().find(|k| !offsets.contains(k)) {
            return Err(Error::invalid_index(format!(
                "keyframe offset {k} matches no frame"
            )));
        }

        Ok(())
    }
}

/// Builder resolving the parallel index tables into frame entries.
#[derive(Debug, Default)]
pub struct TrackIndexBuilder {
    timestamps: Vec<u32>,
    iframe_offsets: Vec<u32>,
    frame_sizes: Vec<u32>,
    frame_offsets: Vec<u32>,
}

impl TrackIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_timestamps(&mut self, timestamps: Vec<u32>) {
        self.timestamps = timestamps;
    }

    pub fn set_iframe_offsets(&mut self, offsets: Vec<u32>) {
        self.iframe_offsets = offsets;
    }

    pub fn set_frame_sizes(&mut self, sizes: Vec<u32>) {
        self.frame_sizes = sizes;
    }

    pub fn set_frame_offsets(&mut self, offsets: Vec<u32>) {
        self.frame_offsets = offsets;
    }

    /// Build the index. Frames beyond the shortest table are dropped.
    pub fn build(self) -> TrackIndex {
        let count = self
            .timestamps
            .len()
            .min(self.frame_sizes.len())
            .min(self.frame_offsets.len());

        if count != self.timestamps.len()
            || count != self.frame_sizes.len()
            || count != self.frame_offsets.len()
        {
            tracing::warn!(
                timestamps = self.timestamps.len(),
                sizes = self.frame_sizes.len(),
                offsets = self.frame_offsets.len(),
                "Index table lengths disagree; using {count} frames"
            );
        }

        let keyframes: HashSet<u32> = self.iframe_offsets.iter().copied().collect();

        let frames = (0..count)
            .map(|i| {
                let offset = self.frame_offsets[i];
                FrameEntry {
                    index: i as u32,
                    timestamp: self.timestamps[i],
                    offset,
                    size: self.frame_sizes[i],
                    is_keyframe: keyframes.contains(&offset),
                }
            })
            .collect();

        TrackIndex {
            frames,
            keyframe_offsets: self.iframe_offsets,
        }
    }
}

/// Size of the fixed track record header.
pub const TRACK_HEADER_SIZE: u64 = 20;

/// A parsed track record.
#[derive(Debug, Clone)]
pub struct TrackDescriptor {
    pub kind: TrackKind,
    /// Declared record size.
    pub record_size: u32,
    /// Record type tag.
    pub record_type: u32,
    /// Raw codec id byte.
    pub codec_tag: u8,
    /// Raw flag byte.
    pub flag: u8,
    /// Track id embedded in every frame header.
    pub track_id: u16,
    pub first_timestamp: u32,
    pub last_timestamp: u32,
    /// Bytes the header and tables actually occupy.
    pub parsed_size: u64,
    pub index: TrackIndex,
}

impl TrackDescriptor {
    /// Parse a track record at the current position.
    pub(crate) fn parse<R: Read + Seek>(
        reader: &mut ByteReader<R>,
        kind: TrackKind,
        check_table_sizes: bool,
    ) -> Result<Self> {
        let record_size = reader.read_u32_le("track size")?;
        let record_type = reader.read_u32_le("track type")?;
        let codec_tag = reader.read_u8("codec id")?;
        let flag = reader.read_u8("track flag")?;
        let track_id = reader.read_u16_le("track id")?;
        let first_timestamp = reader.read_u32_le("first timestamp")?;
        let last_timestamp = reader.read_u32_le("last timestamp")?;

        let mut parsed_size = TRACK_HEADER_SIZE;
        let mut next_table = |reader: &mut ByteReader<R>| -> Result<Vec<u32>> {
            let table = read_table(reader, check_table_sizes)?;
            parsed_size += Table::expected_size(table.len() as u32);
            Ok(table.items)
        };

        let mut builder = TrackIndexBuilder::new();
        builder.set_timestamps(next_table(reader)?);
        if kind.is_video() {
            builder.set_iframe_offsets(next_table(reader)?);
        }
        builder.set_frame_sizes(next_table(reader)?);
        builder.set_frame_offsets(next_table(reader)?);
        let index = builder.build();

        tracing::debug!(
            %kind,
            track_id,
            codec = codec_tag,
            frames = index.len(),
            keyframes = index.keyframe_offsets.len(),
            "Parsed track"
        );

        Ok(Self {
            kind,
            record_size,
            record_type,
            codec_tag,
            flag,
            track_id,
            first_timestamp,
            last_timestamp,
            parsed_size,
            index,
        })
    }

    /// Video codec, if this is the video track.
    pub fn video_codec(&self) -> Option<VideoCodec> {
        self.kind
            .is_video()
            .then(|| VideoCodec::from_u8(self.codec_tag))
    }

    /// Audio codec, if this is the audio track.
    pub fn audio_codec(&self) -> Option<AudioCodec> {
        (!self.kind.is_video()).then(|| AudioCodec::from_u8(self.codec_tag))
    }

    /// Audio parameters from the flag byte, if this is the audio track.
    pub fn audio_params(&self) -> Option<AudioParams> {
        (!self.kind.is_video()).then(|| AudioParams::from_flag(self.flag))
    }

    /// Output codec id.
    pub fn codec_id(&self) -> CodecId {
        match self.kind {
            TrackKind::Video => VideoCodec::from_u8(self.codec_tag).codec_id(),
            TrackKind::Audio => {
                AudioCodec::from_u8(self.codec_tag).codec_id(&AudioParams::from_flag(self.flag))
            }
        }
    }

    /// Whether units need further bitstream framing by the consumer.
    pub fn needs_parsing(&self) -> bool {
        self.audio_codec().is_some_and(|c| c.needs_parsing())
    }

    /// Check the declared record size against the parsed tables, then the
    /// index ordering and keyframe rules.
    pub fn validate(&self) -> Result<()> {
        if u64::from(self.record_size) != self.parsed_size {
            return Err(Error::invalid_index(format!(
                "{} track record declares {} bytes, header and tables occupy {}",
                self.kind, self.record_size, self.parsed_size
            )));
        }
        self.index.validate()
    }

    /// Track duration in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        self.last_timestamp as i64 - self.first_timestamp as i64
    }
}
