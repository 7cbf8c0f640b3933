//! Wire framing: one header byte, then a whole number of ciphertext blocks
//!
//! Frame layout:
//! ```text
//! [1 byte: block count N, 1..=127][N * block_size bytes: ciphertext]
//! ```
//!
//! The frame is the unit of flow control: the decoder reads a frame
//! atomically (header, then exactly the advertised payload) before handing
//! anything to the cipher. End-of-channel before a header byte is a clean
//! EOF; end-of-channel anywhere after it is corruption.

use std::io::{ErrorKind, Read, Write};

use crate::error::{StreamError, StreamResult};

/// Largest block count the one-byte header can carry (it was a signed byte
/// in older deployments of this format, so 127, not 255).
pub const MAX_WIRE_BLOCKS: usize = 127;

/// Write one complete frame: header byte, then the ciphertext.
///
/// The payload length must be a positive multiple of `block_size` no larger
/// than `MAX_WIRE_BLOCKS` blocks; the accumulator capacity cap makes the
/// upper bound unreachable in practice.
pub fn write_frame<W: Write>(out: &mut W, ciphertext: &[u8], block_size: usize) -> StreamResult<()> {
    debug_assert_eq!(ciphertext.len() % block_size, 0);
    let blocks = ciphertext.len() / block_size;
    if blocks == 0 || blocks > MAX_WIRE_BLOCKS {
        return Err(StreamError::Config(format!(
            "frame of {blocks} blocks does not fit the one-byte header (1..={MAX_WIRE_BLOCKS})"
        )));
    }
    out.write_all(&[blocks as u8])?;
    out.write_all(ciphertext)?;
    Ok(())
}

/// Read one complete frame payload, blocking until it is whole.
///
/// Returns `Ok(None)` on a clean EOF (the channel closed before a header
/// byte). A header outside `1..=127` or a channel that closes mid-payload is
/// `StreamError::CorruptFrame`.
pub fn read_frame<R: Read>(input: &mut R, block_size: usize) -> StreamResult<Option<Vec<u8>>> {
    let mut header = [0u8; 1];
    loop {
        match input.read(&mut header) {
            Ok(0) => return Ok(None),
            Ok(_) => break,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(StreamError::Io(e)),
        }
    }

    let blocks = header[0] as usize;
    if blocks == 0 || blocks > MAX_WIRE_BLOCKS {
        return Err(StreamError::CorruptFrame(format!(
            "frame header advertises {blocks} blocks, expected 1..={MAX_WIRE_BLOCKS}"
        )));
    }

    let mut payload = vec![0u8; blocks * block_size];
    input.read_exact(&mut payload).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            StreamError::CorruptFrame(format!(
                "channel closed mid-frame: wanted {} payload bytes",
                payload.len()
            ))
        } else {
            StreamError::Io(e)
        }
    })?;
    Ok(Some(payload))
}
