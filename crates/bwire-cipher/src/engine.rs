//! The block-cipher engine seam and its AES-256-CBC implementation
//!
//! An engine performs exactly one encrypt or decrypt call over one segment,
//! with the key fixed at construction and the IV supplied explicitly by the
//! caller. It holds no chaining state: the rolling processors own the IV
//! hand-off between segments.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::error::CipherError;
use crate::keys::StreamKey;

/// AES block size in bytes, independent of key size.
pub const AES_BLOCK_SIZE: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// One-shot block cipher operating on a single segment under an explicit IV.
///
/// Contract:
/// - `encrypt` applies PKCS#7, so the output length is
///   `((len / block_size) + 1) * block_size` rounded over the padded input;
///   a block-aligned input gains one full padding block.
/// - `decrypt` removes the padding; it rejects empty, non-aligned, and
///   badly padded input.
/// - Both are pure with respect to prior calls.
pub trait BlockCipherEngine {
    fn block_size(&self) -> usize;

    fn encrypt(&self, iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CipherError>;

    fn decrypt(&self, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CipherError>;
}

/// AES-256 in CBC mode with PKCS#7 padding, 16-byte blocks.
#[derive(Clone)]
pub struct Aes256CbcEngine {
    key: StreamKey,
}

impl Aes256CbcEngine {
    pub fn new(key: StreamKey) -> Self {
        Self { key }
    }

    fn check_iv(&self, iv: &[u8]) -> Result<(), CipherError> {
        if iv.len() != AES_BLOCK_SIZE {
            return Err(CipherError::IvLength {
                expected: AES_BLOCK_SIZE,
                actual: iv.len(),
            });
        }
        Ok(())
    }
}

impl BlockCipherEngine for Aes256CbcEngine {
    fn block_size(&self) -> usize {
        AES_BLOCK_SIZE
    }

    fn encrypt(&self, iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        self.check_iv(iv)?;
        let cipher = Aes256CbcEnc::new_from_slices(self.key.as_bytes(), iv)
            .expect("key and IV lengths already validated");
        Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
    }

    fn decrypt(&self, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        self.check_iv(iv)?;
        if ciphertext.is_empty() || ciphertext.len() % AES_BLOCK_SIZE != 0 {
            return Err(CipherError::Misaligned {
                len: ciphertext.len(),
                block_size: AES_BLOCK_SIZE,
            });
        }
        let cipher = Aes256CbcDec::new_from_slices(self.key.as_bytes(), iv)
            .expect("key and IV lengths already validated");
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CipherError::InvalidPadding)
    }
}
