//! Rolling-IV segment processors
//!
//! One processor lives on each side of a channel. Every `process` call covers
//! exactly one segment (one frame's worth of bytes), and the IV for the next
//! segment is the trailing ciphertext block of the current one:
//!
//! ```text
//! encrypt side: iv' = last block of the ciphertext it produced
//! decrypt side: iv' = last block of the ciphertext it was handed
//! ```
//!
//! The two IVs are seeded identically at construction and then evolve in
//! lockstep as long as every frame crosses the channel intact and in order.
//! A dropped or corrupted frame desynchronizes them permanently; there is no
//! resynchronization, the channel is dead.

use crate::engine::BlockCipherEngine;
use crate::error::CipherError;

fn check_iv_seed<E: BlockCipherEngine>(engine: &E, iv: &[u8]) -> Result<(), CipherError> {
    if iv.len() != engine.block_size() {
        return Err(CipherError::IvLength {
            expected: engine.block_size(),
            actual: iv.len(),
        });
    }
    Ok(())
}

/// Encrypt-side processor: seals one segment per call and rolls the IV
/// forward to the trailing block of the ciphertext it produced.
pub struct RollingEncryptor<E: BlockCipherEngine> {
    engine: E,
    iv: Vec<u8>,
}

impl<E: BlockCipherEngine> RollingEncryptor<E> {
    /// Construct with the initial IV agreed with the decrypt side.
    pub fn new(engine: E, iv: &[u8]) -> Result<Self, CipherError> {
        check_iv_seed(&engine, iv)?;
        Ok(Self {
            engine,
            iv: iv.to_vec(),
        })
    }

    pub fn block_size(&self) -> usize {
        self.engine.block_size()
    }

    /// Seal one complete segment. The ciphertext is a positive multiple of
    /// the block size; its trailing block becomes the next segment's IV.
    ///
    /// Empty segments are a caller bug: the accumulator never flushes an
    /// empty buffer, and an empty segment would still emit a padding block
    /// on the wire for zero payload bytes.
    pub fn process(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        if plaintext.is_empty() {
            return Err(CipherError::EmptySegment);
        }
        let ciphertext = self.engine.encrypt(&self.iv, plaintext)?;
        let tail = ciphertext.len() - self.iv.len();
        self.iv.copy_from_slice(&ciphertext[tail..]);
        Ok(ciphertext)
    }
}

/// Decrypt-side processor: recovers one segment per call and rolls the IV
/// forward to the trailing block of the ciphertext it consumed.
pub struct RollingDecryptor<E: BlockCipherEngine> {
    engine: E,
    iv: Vec<u8>,
}

impl<E: BlockCipherEngine> RollingDecryptor<E> {
    /// Construct with the initial IV agreed with the encrypt side.
    pub fn new(engine: E, iv: &[u8]) -> Result<Self, CipherError> {
        check_iv_seed(&engine, iv)?;
        Ok(Self {
            engine,
            iv: iv.to_vec(),
        })
    }

    pub fn block_size(&self) -> usize {
        self.engine.block_size()
    }

    /// Recover one segment's plaintext. The IV update mirrors the encrypt
    /// side: the trailing `block_size` bytes of the *input* ciphertext.
    /// When the segment is exactly one block long, that is the whole input,
    /// taken verbatim.
    pub fn process(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        if ciphertext.is_empty() {
            return Err(CipherError::EmptySegment);
        }
        if ciphertext.len() % self.iv.len() != 0 {
            return Err(CipherError::Misaligned {
                len: ciphertext.len(),
                block_size: self.iv.len(),
            });
        }
        let plaintext = self.engine.decrypt(&self.iv, ciphertext)?;
        let tail = ciphertext.len() - self.iv.len();
        self.iv.copy_from_slice(&ciphertext[tail..]);
        Ok(plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Aes256CbcEngine;
    use crate::keys::StreamKey;
    use proptest::prelude::*;

    const IV: [u8; 16] = [0xA5u8; 16];

    fn engine() -> Aes256CbcEngine {
        Aes256CbcEngine::new(StreamKey::from_bytes([13u8; 32]))
    }

    fn pair() -> (RollingEncryptor<Aes256CbcEngine>, RollingDecryptor<Aes256CbcEngine>) {
        (
            RollingEncryptor::new(engine(), &IV).unwrap(),
            RollingDecryptor::new(engine(), &IV).unwrap(),
        )
    }

    #[test]
    fn test_segments_chain_across_calls() {
        let (mut enc, mut dec) = pair();

        let segments: [&[u8]; 4] = [b"first segment", b"x", &[0u8; 64], b"tail"];
        for segment in segments {
            let ciphertext = enc.process(segment).unwrap();
            let recovered = dec.process(&ciphertext).unwrap();
            assert_eq!(recovered, segment, "segment must survive the chain");
        }
    }

    #[test]
    fn test_iv_advances_to_trailing_ciphertext_block() {
        let (mut enc, _) = pair();

        let ciphertext = enc.process(&[0x42u8; 40]).unwrap();
        assert_eq!(enc.iv, ciphertext[ciphertext.len() - 16..]);
    }

    #[test]
    fn test_decryptor_iv_taken_from_input_not_plaintext() {
        let (mut enc, mut dec) = pair();

        let ciphertext = enc.process(b"whole-frame update").unwrap();
        dec.process(&ciphertext).unwrap();
        assert_eq!(dec.iv, ciphertext[ciphertext.len() - 16..]);
        assert_eq!(dec.iv, enc.iv, "both sides must hold the same next IV");
    }

    #[test]
    fn test_exactly_one_block_updates_from_whole_input() {
        let (mut enc, mut dec) = pair();

        // 15 bytes pad to exactly one ciphertext block
        let ciphertext = enc.process(&[9u8; 15]).unwrap();
        assert_eq!(ciphertext.len(), 16);

        dec.process(&ciphertext).unwrap();
        assert_eq!(dec.iv, ciphertext, "one-block segment: IV is the whole input");
    }

    #[test]
    fn test_same_plaintext_twice_differs_on_the_wire() {
        let (mut enc, mut dec) = pair();

        let c1 = enc.process(b"repeated payload").unwrap();
        let c2 = enc.process(b"repeated payload").unwrap();
        assert_ne!(c1, c2, "rolling IV must change the ciphertext");

        assert_eq!(dec.process(&c1).unwrap(), b"repeated payload");
        assert_eq!(dec.process(&c2).unwrap(), b"repeated payload");
    }

    #[test]
    fn test_empty_segment_is_rejected() {
        let (mut enc, mut dec) = pair();
        assert!(matches!(enc.process(&[]), Err(CipherError::EmptySegment)));
        assert!(matches!(dec.process(&[]), Err(CipherError::EmptySegment)));
    }

    #[test]
    fn test_misaligned_ciphertext_is_rejected() {
        let (_, mut dec) = pair();
        assert!(matches!(
            dec.process(&[0u8; 17]),
            Err(CipherError::Misaligned { len: 17, .. })
        ));
    }

    #[test]
    fn test_dropped_frame_desynchronizes_the_chain() {
        let (mut enc, mut dec) = pair();

        let c1 = enc.process(&[1u8; 32]).unwrap();
        let c2 = enc.process(&[2u8; 32]).unwrap();

        // Deliver frame 2 without frame 1: wrong IV on the decrypt side.
        let _ = c1;
        match dec.process(&c2) {
            Ok(garbled) => assert_ne!(garbled, vec![2u8; 32]),
            Err(CipherError::InvalidPadding) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    proptest! {
        /// Any non-empty segment sequence survives the chained trip, and the
        /// two IVs stay in lockstep the whole way.
        #[test]
        fn prop_chained_segments_roundtrip(
            segments in proptest::collection::vec(
                proptest::collection::vec(any::<u8>(), 1..=512),
                1..=16,
            ),
        ) {
            let (mut enc, mut dec) = pair();
            for segment in &segments {
                let ciphertext = enc.process(segment).unwrap();
                let recovered = dec.process(&ciphertext).unwrap();
                prop_assert_eq!(&recovered, segment);
                prop_assert_eq!(&enc.iv, &dec.iv);
            }
        }
    }

    #[test]
    fn test_mismatched_seed_iv_is_a_construction_error() {
        assert!(matches!(
            RollingEncryptor::new(engine(), &[0u8; 8]),
            Err(CipherError::IvLength {
                expected: 16,
                actual: 8
            })
        ));
        assert!(matches!(
            RollingDecryptor::new(engine(), &[0u8; 24]),
            Err(CipherError::IvLength {
                expected: 16,
                actual: 24
            })
        ));
    }
}
