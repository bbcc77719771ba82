//! Shared fixture writer for integration tests.
//!
//! [`KrfBuilder`] lays out a complete KRF file in memory: header, media-data
//! region with interleaved frame records, and the index section with both
//! track records. [`Fixture`] reports where every frame landed so tests can
//! compare demuxer output against the layout.

#![allow(dead_code)]

use std::io::Cursor;

pub const VIDEO_TRACK_ID: u16 = 1;
pub const AUDIO_TRACK_ID: u16 = 2;
pub const H264: u8 = 0x4E;
pub const AAC_ADTS: u8 = 0x87;
/// 48 kHz, 16-bit, stereo.
pub const AUDIO_FLAG_48K_S16_STEREO: u8 = (8 << 2) | 0b11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    Video,
    Audio,
}

#[derive(Debug, Clone)]
struct FrameSpec {
    track: Track,
    timestamp: u32,
    payload: Vec<u8>,
    keyframe: bool,
    gap_before: usize,
}

/// Where a frame was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub offset: u32,
    pub size: u32,
    pub timestamp: u32,
    pub keyframe: bool,
}

/// A built KRF file.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub bytes: Vec<u8>,
    pub media_data_offset: u64,
    pub index_section_offset: u64,
    pub video: Vec<FrameLayout>,
    pub audio: Vec<FrameLayout>,
}

/// Route library logs to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

impl Fixture {
    pub fn cursor(&self) -> Cursor<Vec<u8>> {
        Cursor::new(self.bytes.clone())
    }

    pub fn first_video_timestamp(&self) -> u32 {
        self.video.first().map_or(0, |f| f.timestamp)
    }
}

/// In-memory KRF writer.
#[derive(Debug, Clone)]
pub struct KrfBuilder {
    extra_header: bool,
    encrypt_type: u32,
    video_codec: u8,
    video_flag: u8,
    audio_codec: u8,
    audio_flag: u8,
    frames: Vec<FrameSpec>,
    pending_gap: usize,
    table_size_bias: u32,
    track_size_bias: u32,
    extra_iframe_offsets: Vec<u32>,
    size_overrides: Vec<(Track, usize, u32)>,
}

impl Default for KrfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl KrfBuilder {
    pub fn new() -> Self {
        Self {
            extra_header: false,
            encrypt_type: 0,
            video_codec: H264,
            video_flag: 0,
            audio_codec: AAC_ADTS,
            audio_flag: AUDIO_FLAG_48K_S16_STEREO,
            frames: Vec::new(),
            pending_gap: 0,
            table_size_bias: 0,
            track_size_bias: 0,
            extra_iframe_offsets: Vec::new(),
            size_overrides: Vec::new(),
        }
    }

    pub fn extra_header(mut self) -> Self {
        self.extra_header = true;
        self
    }

    pub fn encrypt_type(mut self, encrypt_type: u32) -> Self {
        self.encrypt_type = encrypt_type;
        self
    }

    pub fn video_codec(mut self, codec: u8, flag: u8) -> Self {
        self.video_codec = codec;
        self.video_flag = flag;
        self
    }

    pub fn audio_codec(mut self, codec: u8, flag: u8) -> Self {
        self.audio_codec = codec;
        self.audio_flag = flag;
        self
    }

    /// Insert `n` zero bytes before the next frame, or at the end of the
    /// media-data region when no frame follows.
    pub fn gap(mut self, n: usize) -> Self {
        self.pending_gap += n;
        self
    }

    pub fn video(mut self, timestamp: u32, payload: &[u8], keyframe: bool) -> Self {
        self.push(Track::Video, timestamp, payload, keyframe);
        self
    }

    pub fn audio(mut self, timestamp: u32, payload: &[u8]) -> Self {
        self.push(Track::Audio, timestamp, payload, false);
        self
    }

    /// Add `bias` to every table's size field.
    pub fn table_size_bias(mut self, bias: u32) -> Self {
        self.table_size_bias = bias;
        self
    }

    /// Add `bias` to both track records' size fields.
    pub fn track_size_bias(mut self, bias: u32) -> Self {
        self.track_size_bias = bias;
        self
    }

    /// List an offset in the keyframe table that no frame has.
    pub fn extra_iframe_offset(mut self, offset: u32) -> Self {
        self.extra_iframe_offsets.push(offset);
        self
    }

    /// Declare a different size in the index for the `i`th frame of a track.
    pub fn override_frame_size(mut self, track: Track, i: usize, size: u32) -> Self {
        self.size_overrides.push((track, i, size));
        self
    }

    fn push(&mut self, track: Track, timestamp: u32, payload: &[u8], keyframe: bool) {
        self.frames.push(FrameSpec {
            track,
            timestamp,
            payload: payload.to_vec(),
            keyframe,
            gap_before: std::mem::take(&mut self.pending_gap),
        });
    }

    pub fn build(&self) -> Fixture {
        init_tracing();
        let mut buf = Vec::new();

        // File header
        buf.extend_from_slice(b"krf");
        buf.extend_from_slice(&0u32.to_le_bytes()); // file length, patched below
        buf.extend_from_slice(&1u32.to_be_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&self.encrypt_type.to_be_bytes());
        let mut uuid = [0u8; 40];
        uuid[..16].copy_from_slice(b"TEST-RECORDER-01");
        buf.extend_from_slice(&uuid);
        buf.extend_from_slice(&3u32.to_le_bytes());
        buf.extend_from_slice(&1_700_000_000u64.to_le_bytes());
        buf.push(u8::from(self.extra_header));
        if self.extra_header {
            buf.extend_from_slice(&[0xAA; 4]);
        }

        // Media-data region
        let media_data_offset = buf.len() as u64;
        buf.extend_from_slice(&0u32.to_le_bytes()); // size, patched below
        buf.extend_from_slice(&0x6D64_6174u32.to_le_bytes());

        let mut video = Vec::new();
        let mut audio = Vec::new();
        for frame in &self.frames {
            buf.extend(std::iter::repeat(0u8).take(frame.gap_before));
            let (track_id, list) = match frame.track {
                Track::Video => (VIDEO_TRACK_ID, &mut video),
                Track::Audio => (AUDIO_TRACK_ID, &mut audio),
            };
            let layout = FrameLayout {
                offset: buf.len() as u32,
                size: 8 + frame.payload.len() as u32,
                timestamp: frame.timestamp,
                keyframe: frame.keyframe,
            };
            buf.extend_from_slice(&[0xFF, 0xFF]);
            buf.extend_from_slice(&track_id.to_le_bytes());
            buf.extend_from_slice(&(list.len() as u32).to_le_bytes());
            buf.extend_from_slice(&frame.payload);
            list.push(layout);
        }
        buf.extend(std::iter::repeat(0u8).take(self.pending_gap));

        let media_data_size = buf.len() as u64 - media_data_offset;
        buf[media_data_offset as usize..media_data_offset as usize + 4]
            .copy_from_slice(&(media_data_size as u32).to_le_bytes());

        // Index section
        let index_section_offset = buf.len() as u64;
        buf.extend_from_slice(&0u32.to_le_bytes()); // size, patched below
        buf.extend_from_slice(&0x6D68_6472u32.to_le_bytes());

        let sizes = |track: Track, frames: &[FrameLayout]| -> Vec<u32> {
            let mut sizes: Vec<u32> = frames.iter().map(|f| f.size).collect();
            for (t, i, size) in &self.size_overrides {
                if *t == track {
                    sizes[*i] = *size;
                }
            }
            sizes
        };

        let mut iframes: Vec<u32> = video
            .iter()
            .filter(|f| f.keyframe)
            .map(|f| f.offset)
            .collect();
        iframes.extend(&self.extra_iframe_offsets);
        iframes.sort_unstable();

        self.write_track(
            &mut buf,
            self.video_codec,
            self.video_flag,
            VIDEO_TRACK_ID,
            &video,
            &[
                video.iter().map(|f| f.timestamp).collect(),
                iframes,
                sizes(Track::Video, &video),
                video.iter().map(|f| f.offset).collect(),
            ],
        );
        self.write_track(
            &mut buf,
            self.audio_codec,
            self.audio_flag,
            AUDIO_TRACK_ID,
            &audio,
            &[
                audio.iter().map(|f| f.timestamp).collect(),
                sizes(Track::Audio, &audio),
                audio.iter().map(|f| f.offset).collect(),
            ],
        );

        let index_size = buf.len() as u64 - index_section_offset;
        buf[index_section_offset as usize..index_section_offset as usize + 4]
            .copy_from_slice(&(index_size as u32).to_le_bytes());

        let total = buf.len() as u32;
        buf[3..7].copy_from_slice(&total.to_le_bytes());

        Fixture {
            bytes: buf,
            media_data_offset,
            index_section_offset,
            video,
            audio,
        }
    }

    fn write_track(
        &self,
        buf: &mut Vec<u8>,
        codec: u8,
        flag: u8,
        track_id: u16,
        frames: &[FrameLayout],
        tables: &[Vec<u32>],
    ) {
        let start = buf.len();
        buf.extend_from_slice(&0u32.to_le_bytes()); // size, patched below
        buf.extend_from_slice(&0x7472_616Bu32.to_le_bytes());
        buf.push(codec);
        buf.push(flag);
        buf.extend_from_slice(&track_id.to_le_bytes());
        buf.extend_from_slice(&frames.first().map_or(0, |f| f.timestamp).to_le_bytes());
        buf.extend_from_slice(&frames.last().map_or(0, |f| f.timestamp).to_le_bytes());

        for (i, items) in tables.iter().enumerate() {
            let size = 12 + 4 * items.len() as u32 + self.table_size_bias;
            buf.extend_from_slice(&size.to_le_bytes());
            buf.extend_from_slice(&(i as u32).to_le_bytes());
            buf.extend_from_slice(&(items.len() as u32).to_le_bytes());
            for item in items {
                buf.extend_from_slice(&item.to_le_bytes());
            }
        }

        let size = (buf.len() - start) as u32 + self.track_size_bias;
        buf[start..start + 4].copy_from_slice(&size.to_le_bytes());
    }
}

/// Two seconds of 25 fps video with a keyframe every 10 frames, audio
/// interleaved every 40 ms, starting at an absolute timestamp of 5000 ms.
pub fn sample_recording() -> Fixture {
    let mut builder = KrfBuilder::new();
    for i in 0..50u32 {
        let ts = 5000 + i * 40;
        let payload = vec![(i % 251) as u8; 100 + (i as usize % 7) * 13];
        builder = builder.video(ts, &payload, i % 10 == 0);
        builder = builder.audio(ts + 10, &[0xA0 | (i % 16) as u8; 32]);
    }
    builder.build()
}
