use thiserror::Error;

/// Chain table, address and call-encoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("unsupported chain: {0}")]
    UnsupportedChain(u64),
}
