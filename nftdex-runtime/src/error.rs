use thiserror::Error;

#[derive(Error, Debug)]
pub enum DexError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0} contract address not set")]
    NotDeployed(&'static str),

    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Contract call failed: {0}")]
    Call(String),

    #[error("Transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    #[error("Transaction {tx_hash} not confirmed within {waited_secs}s")]
    NeverConfirmed { tx_hash: String, waited_secs: u64 },

    #[error("Chain error: {0}")]
    Chain(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DexError {
    fn from(e: serde_json::Error) -> Self {
        DexError::Serialization(e.to_string())
    }
}
