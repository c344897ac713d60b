//! Chunked bitstream upload state machine.

use core::cmp::min;
use log::{debug, warn};

use crate::driver::ConfigDriver;
use crate::port::ConfigPort;

/// Errors reported by [`ChunkUploader`]. The dispatcher turns every
/// one of them into a stalled control transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadError {
    /// A new chunk was announced before the previous one was drained.
    ChunkInProgress,
    /// Data arrived while no chunk was announced.
    NoChunk,
}

/// Result of feeding the uploader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// Chunk still expects more bytes.
    Pending,
    /// Chunk fully streamed, more chunks are expected.
    ChunkDone,
    /// Final chunk streamed and the FPGA start-up sequence ran.
    Configured,
}

impl Progress {
    /// `true` if the chunk has been fully streamed and the control
    /// transfer can be acknowledged.
    pub fn is_complete(self) -> bool {
        !matches!(self, Progress::Pending)
    }
}

/// Tracks the chunk currently being received from the host.
///
/// The uploader is `Idle` while `remaining() == 0` and `Receiving` otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkUploader {
    declared_size: u16,
    remaining: u16,
    is_final_chunk: bool,
}

impl ChunkUploader {
    /// Uploader in `Idle` state.
    pub const fn new() -> Self {
        Self {
            declared_size: 0,
            remaining: 0,
            is_final_chunk: false,
        }
    }

    /// `true` if no chunk is being received.
    pub fn is_idle(&self) -> bool {
        self.remaining == 0
    }

    /// Size of the last announced chunk.
    pub fn declared_size(&self) -> u16 {
        self.declared_size
    }

    /// Bytes of the current chunk that were not streamed yet.
    pub fn remaining(&self) -> u16 {
        self.remaining
    }

    /// `true` if the last announced chunk ends the bitstream.
    pub fn is_final_chunk(&self) -> bool {
        self.is_final_chunk
    }

    /// Announce a chunk of `declared_size` bytes.
    ///
    /// Any size other than [`ConfigPort::CHUNK_SIZE`] marks the final chunk.
    /// An empty final chunk completes right away. A chunk announced while
    /// another one is still being received is refused and the running
    /// chunk is left untouched.
    pub fn begin_chunk<P: ConfigPort>(
        &mut self,
        declared_size: u16,
        driver: &mut ConfigDriver<P>,
    ) -> Result<Progress, UploadError> {
        if !self.is_idle() {
            warn!(
                "chunk of {} bytes announced with {} bytes outstanding",
                declared_size, self.remaining
            );
            return Err(UploadError::ChunkInProgress);
        }

        self.declared_size = declared_size;
        self.remaining = declared_size;
        self.is_final_chunk = declared_size != P::CHUNK_SIZE;

        debug!(
            "chunk of {} bytes, final: {}",
            declared_size, self.is_final_chunk
        );

        if declared_size == 0 {
            return Ok(self.complete(driver));
        }
        Ok(Progress::Pending)
    }

    /// Stream bytes of the current chunk to the FPGA, in order.
    ///
    /// Bytes past the end of the chunk are dropped.
    pub fn drain<P: ConfigPort>(
        &mut self,
        data: &[u8],
        driver: &mut ConfigDriver<P>,
    ) -> Result<Progress, UploadError> {
        if self.is_idle() {
            return Err(UploadError::NoChunk);
        }

        let take = min(data.len(), self.remaining as usize);
        if take < data.len() {
            warn!("dropping {} bytes past the end of chunk", data.len() - take);
        }

        for &byte in &data[..take] {
            driver.stream_byte(byte);
        }
        self.remaining -= take as u16;

        if self.remaining == 0 {
            Ok(self.complete(driver))
        } else {
            Ok(Progress::Pending)
        }
    }

    /// Drop the current chunk, if any, and return to `Idle`.
    pub fn abort(&mut self) {
        if !self.is_idle() {
            debug!("discarding chunk with {} bytes outstanding", self.remaining);
        }
        self.remaining = 0;
    }

    fn complete<P: ConfigPort>(&mut self, driver: &mut ConfigDriver<P>) -> Progress {
        if self.is_final_chunk {
            driver.finish();
            driver.mark_configured();
            Progress::Configured
        } else {
            Progress::ChunkDone
        }
    }
}
