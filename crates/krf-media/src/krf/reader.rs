//! Container-level parsing of a KRF file.

use super::io::ByteReader;
use super::{FileHeader, KrfFile, TrackDescriptor, TrackKind};
use crate::probe::FORMAT_NAME;
use crate::{DemuxConfig, Error, Result};
use std::io::{Read, Seek};

/// Size of the media-data region header (size + type).
pub const MEDIA_DATA_HEADER_SIZE: u64 = 8;

/// KRF container reader.
///
/// Parses the file header, skips over the media-data region to reach the
/// track records, and leaves the stream positioned at the first frame.
pub(crate) struct KrfReader<'a, R> {
    reader: &'a mut ByteReader<R>,
    config: &'a DemuxConfig,
}

impl<'a, R: Read + Seek> KrfReader<'a, R> {
    pub(crate) fn new(reader: &'a mut ByteReader<R>, config: &'a DemuxConfig) -> Self {
        Self { reader, config }
    }

    /// Parse the container.
    pub fn parse(&mut self) -> Result<KrfFile> {
        self.reader.seek_to(0)?;
        let header = FileHeader::parse(self.reader)?;

        if header.is_encrypted() {
            if self.config.reject_encrypted {
                return Err(Error::Encrypted(header.encrypt_type));
            }
            tracing::warn!(
                encrypt_type = header.encrypt_type,
                "KRF header carries a non-zero encrypt type; payloads are passed through as-is"
            );
        }

        let media_data_offset = header.media_data_header_offset();
        self.reader.seek_to(media_data_offset)?;
        let media_data_size = self.reader.read_u32_le("media data size")?;
        self.reader
            .skip(u64::from(media_data_size).saturating_sub(4), "media data")?;

        let index_section_size = self.reader.read_u32_le("index section size")?;
        self.reader.skip(4, "index section type")?;

        let check = self.config.validate_table_sizes;
        let video = TrackDescriptor::parse(self.reader, TrackKind::Video, check)?;
        let audio = TrackDescriptor::parse(self.reader, TrackKind::Audio, check)?;

        let file = KrfFile {
            header,
            media_data_offset,
            media_data_size,
            index_section_size,
            video,
            audio,
        };

        if self.config.strict_index {
            file.validate()?;
        }

        self.reader.seek_to(file.first_frame_offset())?;

        tracing::debug!(
            format = FORMAT_NAME,
            version = file.header.version,
            media_data_offset,
            media_data_size,
            video_frames = file.video.index.len(),
            audio_frames = file.audio.index.len(),
            "Parsed KRF container"
        );

        Ok(file)
    }
}
