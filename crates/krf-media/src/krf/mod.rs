//! KRF container parsing.
//!
//! A KRF file is laid out as:
//!
//! 1. a 72-byte file header (plus 4 bytes when the extra-header flag is set)
//! 2. the media-data region: `size: u32`, `type: u32`, then frame records
//! 3. the index section: `size: u32`, `type: u32`, the video track record,
//!    then the audio track record
//!
//! Each frame record is `FF FF`, a `u16` track id, a `u32` frame index and
//! `frame_size - 8` payload bytes.

mod codec;
mod header;
pub(crate) mod io;
mod reader;
mod table;
mod track;

pub use codec::{AudioCodec, AudioParams, CodecId, SampleRate, VideoCodec};
pub use header::{FileHeader, EXTRA_HEADER_SIZE, FILE_HEADER_SIZE, MAGIC, UUID_LEN};
pub(crate) use reader::KrfReader;
pub use reader::MEDIA_DATA_HEADER_SIZE;
pub use table::{Table, TABLE_HEADER_SIZE};
pub use track::{
    FrameEntry, TrackDescriptor, TrackIndex, TrackIndexBuilder, TrackKind, TRACK_HEADER_SIZE,
};

use crate::stream::StreamDescriptor;
use crate::{DemuxConfig, Result};
use io::ByteReader;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Parsed KRF container: header, region bounds and both track indexes.
#[derive(Debug, Clone)]
pub struct KrfFile {
    pub header: FileHeader,
    /// File offset of the media-data region.
    pub media_data_offset: u64,
    /// Declared media-data region size, including its own size field.
    pub media_data_size: u32,
    /// Size field that follows the media-data region. Not cross-checked.
    pub index_section_size: u32,
    pub video: TrackDescriptor,
    pub audio: TrackDescriptor,
}

impl KrfFile {
    /// Parse a KRF file from the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::parse(BufReader::new(file), &DemuxConfig::default())
    }

    /// Parse a KRF file from a reader.
    pub fn parse<R: Read + Seek>(reader: R, config: &DemuxConfig) -> Result<Self> {
        let mut reader = ByteReader::new(reader)?;
        KrfReader::new(&mut reader, config).parse()
    }

    /// Offset of the first frame record.
    pub fn first_frame_offset(&self) -> u64 {
        self.media_data_offset + MEDIA_DATA_HEADER_SIZE
    }

    /// End of the media-data region (exclusive).
    pub fn media_data_end(&self) -> u64 {
        self.media_data_offset + self.media_data_size as u64
    }

    /// Video track duration in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        self.video.duration_ms()
    }

    /// Track by kind.
    pub fn track(&self, kind: TrackKind) -> &TrackDescriptor {
        match kind {
            TrackKind::Video => &self.video,
            TrackKind::Audio => &self.audio,
        }
    }

    /// Track whose id matches a frame header.
    pub fn track_by_id(&self, track_id: u16) -> Option<&TrackDescriptor> {
        if track_id == self.video.track_id {
            Some(&self.video)
        } else if track_id == self.audio.track_id {
            Some(&self.audio)
        } else {
            None
        }
    }

    /// Stream descriptors, video first.
    pub fn streams(&self) -> Vec<StreamDescriptor> {
        vec![
            StreamDescriptor::from_track(&self.video),
            StreamDescriptor::from_track(&self.audio),
        ]
    }

    /// Check both track records: declared sizes, ordering and keyframe
    /// subset rules.
    pub fn validate(&self) -> Result<()> {
        self.video.validate()?;
        self.audio.validate()
    }
}
