//! The encrypting write half of a channel pair
//!
//! Wraps any `W: Write` and exposes the ordinary `std::io::Write` surface.
//! Bytes are staged in the block accumulator; every sealed frame is written
//! to the channel immediately and whole, header first. A frame is never
//! written before its contents are fully known.

use std::io::{self, Write};

use bwire_cipher::{BlockCipherEngine, RollingEncryptor};
use tracing::debug;

use crate::accumulator::BlockAccumulator;
use crate::config::StreamConfig;
use crate::error::StreamResult;
use crate::frame::write_frame;

/// Encrypting wrapper over an output channel.
///
/// `flush` seals whatever is buffered into one final (usually short) frame
/// and flushes the channel; dropping the writer without a `flush` or
/// [`finish`](Self::finish) discards any unsealed buffered bytes, so always
/// finish a stream you intend to keep.
pub struct EncryptingWriter<W: Write, E: BlockCipherEngine> {
    inner: W,
    encryptor: RollingEncryptor<E>,
    accumulator: BlockAccumulator,
    block_size: usize,
}

impl<W: Write, E: BlockCipherEngine> EncryptingWriter<W, E> {
    /// Wrap `inner`, sealing frames of `config.blocks_per_frame` blocks.
    ///
    /// Fails on a capacity outside `1..=126` or an IV that does not match
    /// the engine's block size; both ends must be configured consistently
    /// before any byte crosses the channel.
    pub fn new(inner: W, engine: E, iv: &[u8], config: StreamConfig) -> StreamResult<Self> {
        config.validate()?;
        let encryptor = RollingEncryptor::new(engine, iv)?;
        let block_size = encryptor.block_size();
        Ok(Self {
            inner,
            encryptor,
            accumulator: BlockAccumulator::new(block_size * config.blocks_per_frame),
            block_size,
        })
    }

    /// Bytes buffered towards the next frame, not yet on the wire.
    pub fn buffered(&self) -> usize {
        self.accumulator.buffered()
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Flush the final frame and hand back the underlying channel.
    /// Dropping the returned channel is what closes it.
    pub fn finish(mut self) -> io::Result<W> {
        self.flush()?;
        debug!("encrypted stream finished");
        Ok(self.inner)
    }

    fn flush_accumulator(&mut self) -> StreamResult<()> {
        let Self {
            inner,
            encryptor,
            accumulator,
            block_size,
        } = self;
        accumulator.flush(encryptor, &mut |ciphertext| {
            write_frame(inner, ciphertext, *block_size)
        })
    }
}

impl<W: Write, E: BlockCipherEngine> Write for EncryptingWriter<W, E> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Self {
            inner,
            encryptor,
            accumulator,
            block_size,
        } = self;
        accumulator
            .push(encryptor, buf, &mut |ciphertext| {
                write_frame(inner, ciphertext, *block_size)
            })
            .map_err(io::Error::from)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_accumulator().map_err(io::Error::from)?;
        self.inner.flush()
    }
}
