//! KRF file prologue.
//!
//! Fixed 72-byte layout:
//!
//! | offset | size | field                 | byte order |
//! |--------|------|-----------------------|------------|
//! | 0      | 3    | magic `krf`           | BE         |
//! | 3      | 4    | file length           | LE         |
//! | 7      | 4    | section type          | BE         |
//! | 11     | 4    | version               | LE         |
//! | 15     | 4    | encrypt type          | BE         |
//! | 19     | 40   | UUID (not terminated) | -          |
//! | 59     | 4    | channel               | LE         |
//! | 63     | 8    | creation time         | LE         |
//! | 71     | 1    | extra header flag     | -          |
//!
//! A non-zero extra header flag means 4 more bytes precede the media-data
//! region.

use super::io::ByteReader;
use crate::{Error, Result};
use std::io::{Read, Seek};

/// The three signature bytes at offset 0.
pub const MAGIC: [u8; 3] = *b"krf";

/// Size of the fixed file header.
pub const FILE_HEADER_SIZE: u64 = 72;

/// Bytes added after the header when the extra-header flag is set.
pub const EXTRA_HEADER_SIZE: u64 = 4;

/// Length of the on-disk UUID field.
pub const UUID_LEN: usize = 40;

/// Parsed file header.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct FileHeader {
    /// Declared total file length.
    pub file_length: u32,
    /// Section type tag.
    pub section_type: u32,
    /// Format version.
    pub version: u32,
    /// Encryption tag. Read but not acted upon.
    pub encrypt_type: u32,
    /// Recording UUID, cut at the first NUL.
    pub uuid: String,
    /// Device channel.
    pub channel: u32,
    /// Creation time as stored.
    pub create_time: u64,
    /// Raw extra header flag.
    pub extra_header_flag: u8,
}

impl FileHeader {
    /// Parse the header from the start of the stream.
    pub(crate) fn parse<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<Self> {
        let magic = reader.read_u24_be("file magic")?;
        let [_, a, b, c] = magic.to_be_bytes();
        if [a, b, c] != MAGIC {
            return Err(Error::InvalidMagic([a, b, c]));
        }

        let file_length = reader.read_u32_le("file length")?;
        let section_type = reader.read_u32_be("section type")?;
        let version = reader.read_u32_le("version")?;
        let encrypt_type = reader.read_u32_be("encrypt type")?;

        let mut uuid = [0u8; UUID_LEN];
        reader.read_exact(&mut uuid, "uuid")?;

        let channel = reader.read_u32_le("channel")?;
        let create_time = reader.read_u64_le("create time")?;
        let extra_header_flag = reader.read_u8("extra header flag")?;

        Ok(Self {
            file_length,
            section_type,
            version,
            encrypt_type,
            uuid: uuid_to_string(&uuid),
            channel,
            create_time,
            extra_header_flag,
        })
    }

    /// Whether the optional 4-byte extension follows the header.
    pub fn has_extra_header(&self) -> bool {
        self.extra_header_flag != 0
    }

    /// Whether the encrypt tag is set.
    pub fn is_encrypted(&self) -> bool {
        self.encrypt_type != 0
    }

    /// File offset where the media-data region begins.
    pub fn media_data_header_offset(&self) -> u64 {
        if self.has_extra_header() {
            FILE_HEADER_SIZE + EXTRA_HEADER_SIZE
        } else {
            FILE_HEADER_SIZE
        }
    }
}

fn uuid_to_string(raw: &[u8; UUID_LEN]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
