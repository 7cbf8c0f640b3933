use thiserror::Error;

/// Errors raised by the cipher engine and the rolling processors.
///
/// Everything here is fatal for the channel that produced it: there is no
/// resynchronization after a cipher failure, and construction-time errors
/// mean the two ends were configured inconsistently.
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("IV is {actual} bytes, cipher block size is {expected}")]
    IvLength { expected: usize, actual: usize },

    #[error("key is {actual} bytes, expected {expected}")]
    KeyLength { expected: usize, actual: usize },

    #[error("refusing to process an empty segment")]
    EmptySegment,

    #[error("ciphertext length {len} is not a positive multiple of the block size {block_size}")]
    Misaligned { len: usize, block_size: usize },

    #[error("block cipher rejected the ciphertext: bad padding or corrupted data")]
    InvalidPadding,

    #[error("malformed hex key material: {0}")]
    MalformedHex(#[from] hex::FromHexError),
}
