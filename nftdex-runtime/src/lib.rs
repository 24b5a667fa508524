pub mod artifacts;
pub mod chain;
pub mod config;
pub mod contracts;
pub mod error;
pub mod gateway;
pub mod nonce;
pub mod registry;
pub mod services;

pub use chain::ChainClient;
pub use config::Config;
pub use error::DexError;
pub use gateway::ContractWriteGateway;
pub use nonce::NonceSequencer;
