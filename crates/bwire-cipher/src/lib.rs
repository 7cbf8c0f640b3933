//! bwire-cipher: the block-cipher side of the BlockWire transport
//!
//! # Overview
//! - `keys`: 256-bit key material (zeroized on drop) and IV generation
//! - `engine`: the `BlockCipherEngine` seam and the AES-256-CBC implementation
//! - `rolling`: per-segment encrypt/decrypt processors that carry the CBC IV
//!   from one segment to the next
//!
//! Chaining model:
//! ```text
//! segment k   ── encrypt(iv_k) ──▶ ciphertext_k
//! iv_{k+1} = last block of ciphertext_k          (both sides, independently)
//! ```
//!
//! The engine is stateless across calls; all chaining state lives in the
//! rolling processors. Key and initial IV agreement between the two ends of a
//! channel is the caller's concern.

pub mod engine;
pub mod error;
pub mod keys;
pub mod rolling;

pub use engine::{Aes256CbcEngine, BlockCipherEngine, AES_BLOCK_SIZE};
pub use error::CipherError;
pub use keys::{generate_iv, generate_stream_key, StreamKey, KEY_SIZE};
pub use rolling::{RollingDecryptor, RollingEncryptor};
