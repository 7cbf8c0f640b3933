use serde::{Deserialize, Serialize};

use crate::error::StreamError;

/// Hard cap on configurable frame capacity, in plaintext blocks.
///
/// The wire header is one byte holding the ciphertext block count, at most
/// 127. A full accumulator gains one PKCS#7 padding block when sealed, so
/// the largest safe plaintext capacity is 126 blocks.
pub const MAX_BLOCKS_PER_FRAME: usize = 126;

/// Encode-side transport tuning (the decode side needs none).
///
/// Serde-compatible so callers can embed it in their own config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Frame capacity in plaintext blocks; a frame is sealed and written as
    /// soon as this many blocks are buffered (default: 64, max: 126)
    pub blocks_per_frame: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            blocks_per_frame: 64,
        }
    }
}

impl StreamConfig {
    /// Reject capacities the one-byte frame header cannot represent.
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.blocks_per_frame == 0 || self.blocks_per_frame > MAX_BLOCKS_PER_FRAME {
            return Err(StreamError::Config(format!(
                "blocks_per_frame must be in 1..={MAX_BLOCKS_PER_FRAME}, got {}",
                self.blocks_per_frame
            )));
        }
        Ok(())
    }
}
