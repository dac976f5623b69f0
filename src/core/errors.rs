use thiserror::Error;

/// Error type shared by every adapter operation.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Node answered with an error or an unexpected payload.
    #[error("Blockchain error: {0}")]
    BlockchainError(String),
    /// Transport errors while reaching the node.
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Signing failed: {0}")]
    SigningFailed(String),
    #[error("Verification failed: {0}")]
    VerificationFailed(String),
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
    /// Resource not found errors, including unknown asset symbols.
    #[error("Not found: {0}")]
    NotFoundError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl WalletError {
    /// Whether repeating the same call could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WalletError::NetworkError(_) | WalletError::BlockchainError(_))
    }
}

impl From<std::io::Error> for WalletError {
    fn from(err: std::io::Error) -> Self {
        WalletError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        WalletError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for WalletError {
    fn from(err: toml::de::Error) -> Self {
        WalletError::ConfigError(err.to_string())
    }
}

impl From<hex::FromHexError> for WalletError {
    fn from(err: hex::FromHexError) -> Self {
        WalletError::SerializationError(format!("invalid hex: {}", err))
    }
}
