//! Process configuration, loaded once from the environment at startup.

use crate::error::DexError;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub chain: ChainConfig,
    pub contracts: ContractAddressConfig,
    pub artifacts_dir: String,
    pub api_prefix: String,
    pub cors_origin: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub private_key: String,
    /// Default confirmation depth for write operations.
    pub confirmations: u64,
    /// Upper bound on receipt polling, in seconds.
    pub confirmation_timeout_secs: u64,
}

/// Pre-deployed contract addresses, if the operator points the service at an
/// existing deployment instead of deploying through the API.
#[derive(Debug, Clone, Default)]
pub struct ContractAddressConfig {
    pub nft: Option<String>,
    pub pair: Option<String>,
    pub factory: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, DexError> {
        let private_key = std::env::var("PRIVATE_KEY")
            .map_err(|_| DexError::Config("PRIVATE_KEY is required".into()))?;
        if private_key.is_empty() {
            return Err(DexError::Config("PRIVATE_KEY is required".into()));
        }

        let chain_id: u64 = std::env::var("CHAIN_ID")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(31337);

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let confirmations: u64 = std::env::var("TX_CONFIRMATIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);

        let confirmation_timeout_secs: u64 = std::env::var("TX_CONFIRMATION_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);

        Ok(Self {
            server: ServerConfig {
                host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
                port,
            },
            chain: ChainConfig {
                rpc_url: std::env::var("RPC_URL")
                    .unwrap_or_else(|_| "http://localhost:8545".into()),
                chain_id,
                private_key,
                confirmations,
                confirmation_timeout_secs,
            },
            contracts: ContractAddressConfig {
                nft: std::env::var("NFT_CONTRACT_ADDRESS").ok(),
                pair: std::env::var("PAIR_CONTRACT_ADDRESS").ok(),
                factory: std::env::var("PAIR_FACTORY_ADDRESS").ok(),
            },
            artifacts_dir: std::env::var("ARTIFACTS_DIR").unwrap_or_else(|_| "../out".into()),
            api_prefix: std::env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".into()),
            cors_origin: std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_key_required() {
        unsafe { std::env::remove_var("PRIVATE_KEY") };
        assert!(Config::from_env().is_err());

        unsafe { std::env::set_var("PRIVATE_KEY", "0xabc123") };
        let config = Config::from_env().unwrap();
        assert_eq!(config.chain.chain_id, 31337);
        assert_eq!(config.api_prefix, "/api/v1");
        unsafe { std::env::remove_var("PRIVATE_KEY") };
    }
}
