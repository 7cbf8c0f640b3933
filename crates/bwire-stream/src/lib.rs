//! bwire-stream: streaming chained-block encryption over any byte channel
//!
//! A writer pushes an unbounded byte sequence through [`EncryptingWriter`];
//! the paired [`DecryptingReader`] recovers exactly those bytes, in arbitrary
//! chunk sizes, from the other end of the channel.
//!
//! Wire format (one frame per sealed segment):
//! ```text
//! [1 byte: block count N, 1..=127][N * block_size bytes: ciphertext]
//! ```
//!
//! Frames are sealed whenever the accumulator buffer fills, or on an explicit
//! flush of a non-empty buffer. The CBC IV rolls across frames: frame k+1 is
//! chained to the trailing ciphertext block of frame k, on both sides
//! independently. A clean close is simply the channel closing at a frame
//! boundary; the channel closing mid-frame is corruption.
//!
//! No authentication: this transport provides confidentiality only. A reader
//! holding the wrong key, IV, or a damaged stream gets garbage or an
//! `InvalidData` error, never a recovery path.

pub mod accumulator;
pub mod config;
pub mod error;
pub mod frame;
pub mod reader;
pub mod writer;

pub use accumulator::BlockAccumulator;
pub use config::{StreamConfig, MAX_BLOCKS_PER_FRAME};
pub use error::{StreamError, StreamResult};
pub use reader::DecryptingReader;
pub use writer::EncryptingWriter;
