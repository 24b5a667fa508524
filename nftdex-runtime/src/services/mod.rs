//! Domain services: deployment, pools/liquidity, and trading.
//!
//! Each service owns shared handles to the chain client, write gateway,
//! artifact loader, and address registry, and translates between request
//! fields (addresses and ether-denominated decimal strings) and chain-native
//! encodings. Currency-valued inputs are explicit by field — a string is only
//! ever parsed as ether where the API documents it as an amount.

pub mod deploy;
pub mod pool;
pub mod trade;

use alloy::primitives::utils::{format_ether, parse_ether};
use alloy::primitives::{Address, U256};

use crate::error::DexError;

pub(crate) fn parse_address(field: &str, value: &str) -> Result<Address, DexError> {
    value
        .parse()
        .map_err(|e| DexError::Validation(format!("Invalid {field} address: {e}")))
}

/// Parse an ether-denominated decimal string into wei.
pub(crate) fn parse_ether_amount(field: &str, value: &str) -> Result<U256, DexError> {
    parse_ether(value).map_err(|e| DexError::Validation(format!("Invalid {field} amount: {e}")))
}

pub(crate) fn format_wei(value: U256) -> String {
    format_ether(value)
}

pub(crate) fn token_ids_to_u256(token_ids: &[u64]) -> Vec<U256> {
    token_ids.iter().copied().map(U256::from).collect()
}
