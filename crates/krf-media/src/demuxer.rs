//! Packet reading and keyframe seeking over an opened KRF container.

use crate::demux::Demuxer;
use crate::krf::io::ByteReader;
use crate::krf::{KrfFile, KrfReader};
use crate::probe::FORMAT_LONG_NAME;
use crate::{DemuxConfig, Error, Packet, Result, StreamDescriptor};
use bytes::Bytes;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Frame record header: sync marker, track id and frame index.
pub const FRAME_HEADER_SIZE: u64 = 8;

/// Two-byte frame boundary marker.
pub const SYNC_MARKER: [u8; 2] = [0xFF, 0xFF];

const SCAN_CHUNK: usize = 4096;

/// Demuxer for one KRF container.
///
/// Owns the byte stream and the parsed index. The index is built once at
/// open; packet reads and seeks only move the stream cursor.
pub struct KrfDemuxer<R> {
    reader: ByteReader<R>,
    file: KrfFile,
    streams: Vec<StreamDescriptor>,
    config: DemuxConfig,
    current_sample: u64,
}

impl KrfDemuxer<BufReader<File>> {
    /// Open a KRF file with the default configuration.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Opening {} file: {}", FORMAT_LONG_NAME, path.display());
        let file = File::open(path)?;
        Self::with_config(BufReader::new(file), DemuxConfig::default())
    }
}

impl<R: Read + Seek> KrfDemuxer<R> {
    /// Open a KRF container from a reader with the default configuration.
    pub fn new(reader: R) -> Result<Self> {
        Self::with_config(reader, DemuxConfig::default())
    }

    /// Open a KRF container from a reader.
    ///
    /// Any header or index error aborts the open; no partial demuxer is
    /// returned.
    pub fn with_config(reader: R, config: DemuxConfig) -> Result<Self> {
        let mut reader = ByteReader::new(reader)?;
        let file = KrfReader::new(&mut reader, &config).parse()?;
        let streams = file.streams();

        Ok(Self {
            reader,
            file,
            streams,
            config,
            current_sample: 0,
        })
    }

    /// Parsed container.
    pub fn file(&self) -> &KrfFile {
        &self.file
    }

    /// Stream descriptors, video first.
    pub fn streams(&self) -> &[StreamDescriptor] {
        &self.streams
    }

    pub fn config(&self) -> &DemuxConfig {
        &self.config
    }

    /// Number of packets returned so far.
    pub fn current_sample(&self) -> u64 {
        self.current_sample
    }

    /// Video duration in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        self.file.duration_ms()
    }

    /// Current stream position.
    pub fn position(&mut self) -> Result<u64> {
        self.reader.position()
    }

    /// Read the next frame.
    ///
    /// Scans forward for the next sync marker, resolves the frame against
    /// the index and reads its payload. Returns [`Error::EndOfStream`] once
    /// the cursor reaches the end of the media-data region or the stream.
    pub fn read_packet(&mut self) -> Result<Packet> {
        let pos = self.reader.position()?;
        if pos >= self.file.media_data_end() || self.reader.is_eof()? {
            return Err(Error::EndOfStream);
        }

        let marker = self.find_sync(pos)?;
        let track_id = self.reader.read_u16_le("frame track id")?;
        let index = self.reader.read_u32_le("frame index")?;

        let track = self
            .file
            .track_by_id(track_id)
            .ok_or(Error::UnknownTrack {
                track_id,
                offset: marker,
            })?;
        let kind = track.kind;
        let frame = *track.index.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: track.index.len(),
        })?;

        let pts = frame.timestamp as i64 - self.file.video.first_timestamp as i64;
        let payload_len = (frame.size as u64).saturating_sub(FRAME_HEADER_SIZE);
        let data_pos = self.reader.position()?;
        let have = self.reader.remaining()?;
        if payload_len > have {
            return Err(Error::TruncatedFrame {
                index,
                expected: payload_len,
                found: have,
            });
        }

        let mut data = vec![0u8; payload_len as usize];
        self.reader.read_exact(&mut data, "frame payload")?;
        self.current_sample += 1;

        tracing::trace!(
            %kind,
            index,
            pts,
            size = payload_len,
            key = frame.is_keyframe,
            "Read frame at {marker}"
        );

        Ok(Packet {
            stream_index: kind.stream_index(),
            kind,
            pts,
            dts: pts,
            is_keyframe: kind.is_video() && frame.is_keyframe,
            frame_index: index,
            frame_offset: frame.offset,
            frame_size: frame.size,
            pos: data_pos,
            data: Bytes::from(data),
        })
    }

    /// Seek to the keyframe at or before `timestamp`.
    ///
    /// `timestamp` is in milliseconds relative to the first video frame.
    /// The video index is always used, whatever `stream_index` names.
    /// Returns the byte offset the stream was moved to.
    pub fn seek(&mut self, stream_index: usize, timestamp: i64) -> Result<u64> {
        let target = timestamp.saturating_add(self.file.video.first_timestamp as i64);
        let offset = u64::from(self.file.video.index.keyframe_offset_for(target)?);
        self.reader.seek_to(offset)?;

        tracing::debug!(stream_index, timestamp, offset, "Seeked to keyframe");
        Ok(offset)
    }

    /// Move back to the first frame.
    pub fn rewind(&mut self) -> Result<()> {
        self.reader.seek_to(self.file.first_frame_offset())?;
        self.current_sample = 0;
        Ok(())
    }

    /// Iterate over the remaining packets.
    pub fn packets(&mut self) -> Packets<'_, R> {
        Packets {
            demuxer: self,
            done: false,
        }
    }

    /// Release the index and hand back the byte stream.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    /// Scan for `FF FF`, leaving the stream just past it.
    ///
    /// The scan never leaves the media-data region. Reaching the region end
    /// yields [`Error::EndOfStream`]; exhausting the configured bound first
    /// yields [`Error::SyncNotFound`]. Returns the marker's offset.
    fn find_sync(&mut self, start: u64) -> Result<u64> {
        let region_left = self.file.media_data_end().saturating_sub(start);
        let limit = self
            .config
            .sync_scan_limit(self.file.media_data_size as u64);
        let window = region_left.min(limit);
        let mut buf = [0u8; SCAN_CHUNK];
        let mut scanned = 0u64;
        let mut prev = 0u8;

        loop {
            if scanned >= window {
                if scanned >= region_left {
                    return Err(Error::EndOfStream);
                }
                return Err(Error::SyncNotFound { start, scanned });
            }

            let want = (window - scanned).min(SCAN_CHUNK as u64) as usize;
            let n = self.reader.read_some(&mut buf[..want])?;
            if n == 0 {
                return Err(Error::EndOfStream);
            }

            for (i, &b) in buf[..n].iter().enumerate() {
                if [prev, b] == SYNC_MARKER {
                    let marker = start + scanned + i as u64 - 1;
                    self.reader.seek_to(marker + SYNC_MARKER.len() as u64)?;
                    return Ok(marker);
                }
                prev = b;
            }
            scanned += n as u64;
        }
    }
}

impl<R: Read + Seek> Demuxer for KrfDemuxer<R> {
    fn streams(&self) -> &[StreamDescriptor] {
        KrfDemuxer::streams(self)
    }

    fn read_packet(&mut self) -> Result<Packet> {
        KrfDemuxer::read_packet(self)
    }

    fn seek(&mut self, stream_index: usize, timestamp: i64) -> Result<()> {
        KrfDemuxer::seek(self, stream_index, timestamp).map(|_| ())
    }
}

/// Iterator over packets until end of stream.
///
/// Stops after the first error.
pub struct Packets<'a, R> {
    demuxer: &'a mut KrfDemuxer<R>,
    done: bool,
}

impl<R: Read + Seek> Iterator for Packets<'_, R> {
    type Item = Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.demuxer.read_packet() {
            Ok(packet) => Some(Ok(packet)),
            Err(Error::EndOfStream) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
