pub mod response;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use nftdex_runtime::artifacts::ArtifactLoader;
use nftdex_runtime::chain::ChainClient;
use nftdex_runtime::config::Config;
use nftdex_runtime::error::DexError;
use nftdex_runtime::gateway::{ContractWriteGateway, SubmissionTracker};
use nftdex_runtime::nonce::NonceSequencer;
use nftdex_runtime::registry::{ContractAddresses, ContractRegistry};
use nftdex_runtime::services::deploy::DeployService;
use nftdex_runtime::services::pool::PoolService;
use nftdex_runtime::services::trade::TradeService;

pub struct ApiState {
    pub chain: Arc<ChainClient>,
    pub nonces: NonceSequencer,
    pub tracker: Arc<SubmissionTracker>,
    pub registry: Arc<ContractRegistry>,
    pub artifacts: Arc<ArtifactLoader>,
    pub deploy: DeployService,
    pub pool: PoolService,
    pub trade: TradeService,
}

impl ApiState {
    /// Wire the full service graph from configuration. No network traffic;
    /// connectivity is checked separately at startup.
    pub fn from_config(config: &Config) -> Result<Arc<Self>, DexError> {
        let chain = Arc::new(ChainClient::new(
            &config.chain.rpc_url,
            &config.chain.private_key,
            config.chain.chain_id,
        )?);

        let nonces = NonceSequencer::new(chain.clone());
        let gateway = Arc::new(ContractWriteGateway::new(chain.clone(), nonces.clone()));
        let tracker = gateway.tracker();
        let artifacts = Arc::new(ArtifactLoader::new(config.artifacts_dir.clone()));
        let registry = Arc::new(ContractRegistry::new(parse_initial_addresses(
            &config.contracts,
        )?));

        let confirmations = config.chain.confirmations;
        let timeout = Duration::from_secs(config.chain.confirmation_timeout_secs);

        Ok(Arc::new(Self {
            deploy: DeployService::new(
                chain.clone(),
                gateway.clone(),
                artifacts.clone(),
                registry.clone(),
                confirmations,
                timeout,
            ),
            pool: PoolService::new(
                chain.clone(),
                gateway.clone(),
                registry.clone(),
                confirmations,
                timeout,
            ),
            trade: TradeService::new(
                chain.clone(),
                gateway.clone(),
                registry.clone(),
                confirmations,
                timeout,
            ),
            chain,
            nonces,
            tracker,
            registry,
            artifacts,
        }))
    }
}

fn parse_initial_addresses(
    config: &nftdex_runtime::config::ContractAddressConfig,
) -> Result<ContractAddresses, DexError> {
    let parse = |field: &str, value: &Option<String>| -> Result<_, DexError> {
        value
            .as_deref()
            .map(|v| {
                v.parse().map_err(|e| {
                    DexError::Config(format!("Invalid configured {field} address: {e}"))
                })
            })
            .transpose()
    };

    Ok(ContractAddresses {
        nft: parse("NFT", &config.nft)?,
        pair: parse("Pair", &config.pair)?,
        factory: parse("PairFactory", &config.factory)?,
    })
}

/// Assemble the router: domain routes under `prefix`, service routes at root.
pub fn build_router(state: Arc<ApiState>, prefix: &str) -> Router {
    let api = Router::new()
        .merge(routes::deploy::router())
        .merge(routes::pool::router())
        .merge(routes::trade::router())
        .merge(routes::web3::router());

    Router::new()
        .merge(routes::health::router())
        .nest(prefix, api)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
