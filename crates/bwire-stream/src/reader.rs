//! The decrypting read half of a channel pair
//!
//! Wraps any `R: Read` and serves the original plaintext through the
//! ordinary `std::io::Read` surface. Internally a two-state machine: either
//! a decrypted frame is buffered and reads are served from it, or the buffer
//! is drained and the next read blocks for exactly one whole frame. Reads
//! never block while something can already be served: once a call has copied
//! any bytes it returns them instead of fetching another frame.

use std::io::{self, Read};

use bwire_cipher::{BlockCipherEngine, RollingDecryptor};
use tracing::trace;

use crate::error::StreamResult;
use crate::frame::read_frame;

/// Decrypting wrapper over an input channel.
///
/// After any `InvalidData` error (mid-frame truncation, bad padding, a
/// nonsense header) the channel is permanently unusable: the rolling IV has
/// diverged and no further frame can decrypt. Clean EOF is sticky and is
/// reported as `Ok(0)` forever after.
pub struct DecryptingReader<R: Read, E: BlockCipherEngine> {
    inner: R,
    decryptor: RollingDecryptor<E>,
    block_size: usize,
    plain: Vec<u8>,
    pos: usize,
    eof: bool,
}

impl<R: Read, E: BlockCipherEngine> DecryptingReader<R, E> {
    /// Wrap `inner`. The IV must be the one the encrypt side was seeded
    /// with, exactly one block long.
    pub fn new(inner: R, engine: E, iv: &[u8]) -> StreamResult<Self> {
        let decryptor = RollingDecryptor::new(engine, iv)?;
        let block_size = decryptor.block_size();
        Ok(Self {
            inner,
            decryptor,
            block_size,
            plain: Vec::new(),
            pos: 0,
            eof: false,
        })
    }

    /// Decrypted bytes that can be read right now without touching the
    /// underlying channel.
    pub fn available(&self) -> usize {
        self.plain.len() - self.pos
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Block for the next frame. `false` means the channel closed cleanly
    /// at a frame boundary. The plaintext buffer is replaced wholesale.
    fn fetch_frame(&mut self) -> StreamResult<bool> {
        match read_frame(&mut self.inner, self.block_size)? {
            None => Ok(false),
            Some(payload) => {
                self.plain = self.decryptor.process(&payload)?;
                self.pos = 0;
                trace!(
                    ciphertext = payload.len(),
                    plaintext = self.plain.len(),
                    "frame decoded"
                );
                Ok(true)
            }
        }
    }
}

impl<R: Read, E: BlockCipherEngine> Read for DecryptingReader<R, E> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        let mut copied = 0;
        loop {
            if self.pos < self.plain.len() {
                let n = (self.plain.len() - self.pos).min(out.len() - copied);
                out[copied..copied + n].copy_from_slice(&self.plain[self.pos..self.pos + n]);
                self.pos += n;
                copied += n;
            }
            // Serve what we have rather than block for another frame. A
            // foreign encoder could emit a frame that decodes to nothing;
            // keep fetching in that case instead of faking an EOF.
            if copied > 0 || self.eof {
                return Ok(copied);
            }
            if !self.fetch_frame().map_err(io::Error::from)? {
                self.eof = true;
                return Ok(0);
            }
        }
    }
}
