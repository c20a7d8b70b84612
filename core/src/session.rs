//! A connected wallet and the contract handles bound to it.

use alloy_primitives::Address;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::asset::{AssetId, AssetInfo, AssetRegistry};
use crate::contract::{Confirmations, Erc20Token, LendingPool};

/// Handles needed to read markets without a connected wallet.
#[derive(Clone)]
pub struct MarketObserver {
    pub pool: Arc<dyn LendingPool>,
    pub assets: AssetRegistry,
    pub rate_decimals: u8,
}

/// One connected account. Passed explicitly to every component that needs
/// it; dropping the session is a disconnect.
#[derive(Clone)]
pub struct Session {
    account: Address,
    chain_id: Option<u64>,
    pool: Arc<dyn LendingPool>,
    confirmations: Arc<dyn Confirmations>,
    tokens: BTreeMap<AssetId, Arc<dyn Erc20Token>>,
    assets: AssetRegistry,
    rate_decimals: u8,
}

impl Session {
    pub fn new(
        account: Address,
        pool: Arc<dyn LendingPool>,
        confirmations: Arc<dyn Confirmations>,
    ) -> Self {
        Self {
            account,
            chain_id: None,
            pool,
            confirmations,
            tokens: BTreeMap::new(),
            assets: AssetRegistry::new(),
            rate_decimals: 18,
        }
    }

    /// Register an asset with its resolved precision and token handle.
    pub fn with_asset(mut self, info: AssetInfo, token: Arc<dyn Erc20Token>) -> Self {
        self.assets.insert(info);
        self.tokens.insert(info.id, token);
        self
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn with_rate_decimals(mut self, rate_decimals: u8) -> Self {
        self.rate_decimals = rate_decimals;
        self
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn pool(&self) -> &Arc<dyn LendingPool> {
        &self.pool
    }

    pub fn confirmations(&self) -> &Arc<dyn Confirmations> {
        &self.confirmations
    }

    pub fn token(&self, asset: AssetId) -> Option<&Arc<dyn Erc20Token>> {
        self.tokens.get(&asset)
    }

    pub fn asset(&self, asset: AssetId) -> Option<&AssetInfo> {
        self.assets.get(asset)
    }

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn rate_decimals(&self) -> u8 {
        self.rate_decimals
    }

    /// A read-only view over the same pool, for the market loader.
    pub fn observer(&self) -> MarketObserver {
        MarketObserver {
            pool: Arc::clone(&self.pool),
            assets: self.assets.clone(),
            rate_decimals: self.rate_decimals,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("account", &self.account)
            .field("chain_id", &self.chain_id)
            .field("pool", &self.pool.address())
            .field("assets", &self.assets)
            .finish()
    }
}

/// First six and last four characters of an address, for headers.
pub fn short_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}
