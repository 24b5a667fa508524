//! Domain service behavior against a scripted node.

mod common;

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use alloy::sol_types::{SolCall, SolValue};
use serde_json::json;

use nftdex_runtime::chain::ChainClient;
use nftdex_runtime::contracts::IPair;
use nftdex_runtime::error::DexError;
use nftdex_runtime::gateway::ContractWriteGateway;
use nftdex_runtime::nonce::NonceSequencer;
use nftdex_runtime::registry::{ContractAddresses, ContractRegistry};
use nftdex_runtime::services::pool::PoolService;
use nftdex_runtime::services::trade::TradeService;

use common::{CHAIN_ID, TEST_KEY, start_mock_node};

const PAIR: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
const FACTORY: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
const POOL: &str = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";

struct Services {
    pool: PoolService,
    trade: TradeService,
    registry: Arc<ContractRegistry>,
}

fn build_services(uri: &str, initial: ContractAddresses) -> Services {
    let chain = Arc::new(
        ChainClient::new(uri, TEST_KEY, CHAIN_ID)
            .unwrap()
            .with_receipt_poll_interval(Duration::from_millis(10)),
    );
    let gateway = Arc::new(ContractWriteGateway::new(
        chain.clone(),
        NonceSequencer::new(chain.clone()),
    ));
    let registry = Arc::new(ContractRegistry::new(initial));

    Services {
        pool: PoolService::new(
            chain.clone(),
            gateway.clone(),
            registry.clone(),
            1,
            Duration::from_secs(1),
        ),
        trade: TradeService::new(chain, gateway, registry.clone(), 1, Duration::from_secs(1)),
        registry,
    }
}

fn with_pair() -> ContractAddresses {
    ContractAddresses {
        pair: Some(PAIR.parse().unwrap()),
        ..Default::default()
    }
}

fn with_factory() -> ContractAddresses {
    ContractAddresses {
        factory: Some(FACTORY.parse().unwrap()),
        ..Default::default()
    }
}

fn selector<C: SolCall>() -> String {
    format!("0x{}", hex::encode(C::SELECTOR))
}

fn encoded<T>(value: T) -> String
where
    T: SolValue,
{
    format!("0x{}", hex::encode(value.abi_encode()))
}

#[tokio::test]
async fn current_price_decodes_to_ether_units() {
    let (server, state) = start_mock_node().await;
    let services = build_services(&server.uri(), with_pair());

    let one_ether = U256::from(10u64).pow(U256::from(18u64));
    state.set_call_result(
        &selector::<IPair::getCurrentPriceCall>(),
        &encoded(one_ether),
    );

    let price = services.trade.current_price().await.unwrap();
    assert_eq!(price, "1.000000000000000000");
}

#[tokio::test]
async fn price_without_pair_is_not_deployed() {
    let (server, _state) = start_mock_node().await;
    let services = build_services(&server.uri(), ContractAddresses::default());

    let err = services.trade.current_price().await.unwrap_err();
    assert!(matches!(err, DexError::NotDeployed("Pair")));
}

#[tokio::test]
async fn reverted_read_is_a_typed_call_failure() {
    let (server, _state) = start_mock_node().await;
    let services = build_services(&server.uri(), with_pair());

    // No canned result: the node reports a revert.
    let err = services.trade.current_price().await.unwrap_err();
    assert!(matches!(err, DexError::Call(_)));
    assert!(err.to_string().contains("getCurrentPrice"));
}

#[tokio::test]
async fn trade_history_decodes_records() {
    let (server, state) = start_mock_node().await;
    let services = build_services(&server.uri(), with_pair());

    let trades = vec![IPair::TradeInfo {
        trader: PAIR.parse().unwrap(),
        isBuy: true,
        price: U256::from(2u64) * U256::from(10u64).pow(U256::from(18u64)),
        timestamp: U256::from(1_700_000_000u64),
    }];
    state.set_call_result(&selector::<IPair::getTradeHistoryCall>(), &encoded(trades));

    let history = services.trade.trade_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].is_buy);
    assert_eq!(history[0].price, "2.000000000000000000");
    assert_eq!(history[0].timestamp, 1_700_000_000);
}

#[tokio::test]
async fn reserves_decode_both_sides() {
    let (server, state) = start_mock_node().await;
    let services = build_services(&server.uri(), with_pair());

    let reserves = (
        U256::from(5u64) * U256::from(10u64).pow(U256::from(18u64)),
        U256::from(12u64),
    );
    state.set_call_result(
        &selector::<IPair::getPoolReservesCall>(),
        &format!("0x{}", hex::encode(reserves.abi_encode_params())),
    );

    let decoded = services.pool.reserves().await.unwrap();
    assert_eq!(decoded.eth_reserve, "5.000000000000000000");
    assert_eq!(decoded.nft_reserve, 12);
}

#[tokio::test]
async fn sell_rejects_malformed_price_before_touching_the_chain() {
    let (server, state) = start_mock_node().await;
    let services = build_services(&server.uri(), with_pair());

    let err = services.trade.sell(1, "not-a-price").await.unwrap_err();
    assert!(matches!(err, DexError::Validation(_)));
    assert!(state.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_pool_reads_the_pool_created_event() {
    let (server, state) = start_mock_node().await;
    let services = build_services(&server.uri(), with_factory());

    let pool: Address = POOL.parse().unwrap();
    let nft: Address = PAIR.parse().unwrap();
    let pool_topic = format!("0x{}", hex::encode(pool.into_word()));
    let nft_topic = format!("0x{}", hex::encode(nft.into_word()));

    *state.receipt_logs.lock().unwrap() = vec![json!({
        "address": FACTORY.to_lowercase(),
        "topics": [format!("0x{}", "22".repeat(32)), pool_topic, nft_topic],
        "data": "0x",
        "blockHash": format!("0x{}", "11".repeat(32)),
        "blockNumber": "0x1",
        "transactionHash": format!("0x{}", "33".repeat(32)),
        "transactionIndex": "0x0",
        "logIndex": "0x0",
        "removed": false,
    })];

    let creation = services.pool.create_pool(PAIR).await.unwrap();
    assert_eq!(creation.pool_address, format!("{pool}"));

    // The new pool became the active pair.
    let registered = services.registry.pair().await.unwrap();
    assert_eq!(registered, pool);
}
