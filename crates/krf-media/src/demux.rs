//! Host framework seam.

use crate::{Packet, Result, StreamDescriptor};

/// A demuxer driven by a host framework.
///
/// Calls on one instance must be serialized: seeking moves the same stream
/// cursor the packet reader uses.
pub trait Demuxer {
    /// Streams in this container.
    fn streams(&self) -> &[StreamDescriptor];

    /// Read the next packet. Returns [`crate::Error::EndOfStream`] when done.
    fn read_packet(&mut self) -> Result<Packet>;

    /// Seek to a timestamp in stream time base units.
    fn seek(&mut self, stream_index: usize, timestamp: i64) -> Result<()>;
}
