//! Key material: the shared symmetric key and initial-IV generation

use rand::RngCore;
use zeroize::Zeroize;

use crate::error::CipherError;

/// Size of a stream key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// The 256-bit symmetric key shared by both ends of one channel pair.
/// Read-only once constructed; zeroized on drop.
#[derive(Clone)]
pub struct StreamKey {
    bytes: [u8; KEY_SIZE],
}

impl StreamKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Parse a key from its 64-character hex form (the key-file encoding).
    pub fn from_hex(s: &str) -> Result<Self, CipherError> {
        let decoded = hex::decode(s.trim())?;
        if decoded.len() != KEY_SIZE {
            return Err(CipherError::KeyLength {
                expected: KEY_SIZE,
                actual: decoded.len(),
            });
        }
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&decoded);
        Ok(Self::from_bytes(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl Drop for StreamKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for StreamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Generate a random 256-bit stream key.
pub fn generate_stream_key() -> StreamKey {
    let mut bytes = [0u8; KEY_SIZE];
    rand::thread_rng().fill_bytes(&mut bytes);
    StreamKey::from_bytes(bytes)
}

/// Generate a random initial IV of exactly `block_size` bytes.
///
/// Both ends of a channel must be seeded with the same value; distributing
/// it is the caller's concern (the CLI puts it in the key file).
pub fn generate_iv(block_size: usize) -> Vec<u8> {
    let mut iv = vec![0u8; block_size];
    rand::thread_rng().fill_bytes(&mut iv);
    iv
}
