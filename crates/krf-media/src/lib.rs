//! krf-media: KRF container parsing, demuxing and keyframe seeking
//!
//! KRF ("Kalay Record Format", `.mkr`) is a recording container holding one
//! interleaved video and one audio elementary stream plus index tables that
//! enable random access. This crate parses the container, hands out stream
//! descriptors and per-frame packets, and maps a presentation time to the
//! nearest preceding keyframe. Payloads are passed through undecoded.
//!
//! # Modules
//!
//! - `krf` - file header, index tables, track records and codec mapping
//! - `demuxer` - packet reader and seek engine over an open container
//! - `probe` - magic-byte detection
//! - `config` - demuxer options
//!
//! # Example
//!
//! ```no_run
//! use krf_media::KrfDemuxer;
//!
//! let mut demuxer = KrfDemuxer::open("recording.mkr")?;
//! demuxer.seek(0, 5_000)?;
//! for packet in demuxer.packets() {
//!     let packet = packet?;
//!     println!("{} {} {}", packet.stream_index, packet.pts, packet.len());
//! }
//! # Ok::<(), krf_media::Error>(())
//! ```

pub mod config;
pub mod demux;
pub mod demuxer;
pub mod error;
pub mod krf;
pub mod packet;
pub mod probe;
pub mod stream;

pub use config::DemuxConfig;
pub use demux::Demuxer;
pub use demuxer::{KrfDemuxer, Packets};
pub use error::{Error, Result};
pub use krf::{KrfFile, TrackKind};
pub use packet::Packet;
pub use probe::probe;
pub use stream::{StreamDescriptor, TimeBase};
