//! Block accumulation: arbitrary writes in, sealed frame payloads out
//!
//! The accumulator owns a fixed buffer of `block_size * blocks_per_frame`
//! bytes and a fill cursor. Writes of any size and timing are copied in;
//! the moment the buffer is exactly full it is sealed through the rolling
//! encryptor and handed to the `emit` closure as one frame payload. An
//! explicit flush seals whatever prefix is buffered. The cursor is reset
//! before `emit` runs, so the invariant "cursor is 0 immediately after the
//! buffer is processed" holds even when the emit write fails.

use bwire_cipher::{BlockCipherEngine, RollingEncryptor};
use tracing::trace;

use crate::error::StreamResult;

/// Fixed-capacity, block-aligned staging buffer for the encrypt side.
pub struct BlockAccumulator {
    buf: Vec<u8>,
    filled: usize,
}

impl BlockAccumulator {
    /// `capacity` is in bytes and must be a positive multiple of the cipher
    /// block size; the writer derives it from a validated `StreamConfig`.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity],
            filled: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes currently buffered and not yet sealed into a frame.
    pub fn buffered(&self) -> usize {
        self.filled
    }

    /// Copy `input` in, sealing a frame through `enc` every time the buffer
    /// fills. One call emits zero, one, or many frame payloads; a trailing
    /// remainder smaller than the free space is buffered and nothing more is
    /// emitted for it.
    pub fn push<E, F>(
        &mut self,
        enc: &mut RollingEncryptor<E>,
        mut input: &[u8],
        emit: &mut F,
    ) -> StreamResult<()>
    where
        E: BlockCipherEngine,
        F: FnMut(&[u8]) -> StreamResult<()>,
    {
        while !input.is_empty() {
            let free = self.buf.len() - self.filled;
            let take = input.len().min(free);
            self.buf[self.filled..self.filled + take].copy_from_slice(&input[..take]);
            self.filled += take;
            input = &input[take..];

            if self.filled == self.buf.len() {
                let ciphertext = enc.process(&self.buf)?;
                self.filled = 0;
                trace!(bytes = self.buf.len(), "sealed full frame");
                emit(&ciphertext)?;
            }
        }
        Ok(())
    }

    /// Seal the buffered prefix, if any. A no-op on an empty buffer, so
    /// back-to-back flushes never emit empty frames.
    pub fn flush<E, F>(&mut self, enc: &mut RollingEncryptor<E>, emit: &mut F) -> StreamResult<()>
    where
        E: BlockCipherEngine,
        F: FnMut(&[u8]) -> StreamResult<()>,
    {
        if self.filled == 0 {
            return Ok(());
        }
        let ciphertext = enc.process(&self.buf[..self.filled])?;
        let sealed = self.filled;
        self.filled = 0;
        trace!(bytes = sealed, "sealed partial frame on flush");
        emit(&ciphertext)?;
        Ok(())
    }
}
