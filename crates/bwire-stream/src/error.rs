use thiserror::Error;

use bwire_cipher::CipherError;

pub type StreamResult<T> = Result<T, StreamError>;

/// Transport-level failures.
///
/// Every variant except construction-time `Config` leaves the channel
/// unusable: nothing is retried internally, and there is no frame
/// resynchronization. Callers discard both wrapper ends and renegotiate.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("config error: {0}")]
    Config(String),

    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),

    #[error("corrupt stream: {0}")]
    CorruptFrame(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Surfaces transport errors through the `std::io` traits.
///
/// Corruption and cipher failures map to `InvalidData` so callers can tell
/// them apart from a clean EOF (`Ok(0)`); construction-class errors map to
/// `InvalidInput`.
impl From<StreamError> for std::io::Error {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Io(io) => io,
            other => {
                let kind = match &other {
                    StreamError::Config(_) => std::io::ErrorKind::InvalidInput,
                    _ => std::io::ErrorKind::InvalidData,
                };
                std::io::Error::new(kind, other)
            }
        }
    }
}
