//! Remote interfaces the dashboard depends on.
//!
//! The lending contract and the token contracts are external and fixed. These
//! traits are the only way the rest of the crate touches them, so a session can
//! be assembled from real JSON-RPC handles or from in-memory fakes.

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use std::sync::Arc;

use crate::error::RemoteError;
use crate::model::RawMarketData;

/// Final state of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    Confirmed,
    Reverted,
}

/// The wallet the user connects with.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet for account access. May prompt the user.
    async fn request_accounts(&self) -> Result<Vec<Address>, RemoteError>;

    async fn chain_id(&self) -> Result<u64, RemoteError>;
}

/// Waits for submitted transactions to be mined.
#[async_trait]
pub trait Confirmations: Send + Sync {
    /// Block until the transaction is mined. Unbounded; callers that need a
    /// deadline wrap this in a timeout.
    async fn wait(&self, tx: TxHash) -> Result<TxOutcome, RemoteError>;
}

/// The lending pool contract.
#[async_trait]
pub trait LendingPool: Send + Sync {
    fn address(&self) -> Address;

    async fn supply(&self, asset: Address, amount: U256) -> Result<TxHash, RemoteError>;
    async fn withdraw(&self, asset: Address, amount: U256) -> Result<TxHash, RemoteError>;
    async fn borrow(&self, asset: Address, amount: U256) -> Result<TxHash, RemoteError>;
    async fn repay(&self, asset: Address, amount: U256) -> Result<TxHash, RemoteError>;

    async fn get_user_supply(&self, user: Address, asset: Address) -> Result<U256, RemoteError>;
    async fn get_user_borrow(&self, user: Address, asset: Address) -> Result<U256, RemoteError>;
    async fn get_health_factor(&self, user: Address) -> Result<U256, RemoteError>;
    async fn get_market_data(&self, asset: Address) -> Result<RawMarketData, RemoteError>;
}

/// An ERC-20 token listed by the pool.
#[async_trait]
pub trait Erc20Token: Send + Sync {
    fn address(&self) -> Address;

    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash, RemoteError>;
    async fn decimals(&self) -> Result<u8, RemoteError>;
    async fn balance_of(&self, owner: Address) -> Result<U256, RemoteError>;
}

/// Builds contract handles, optionally bound to a signing account.
pub trait ContractFactory: Send + Sync {
    fn lending_pool(&self, address: Address, signer: Option<Address>) -> Arc<dyn LendingPool>;
    fn token(&self, address: Address, signer: Option<Address>) -> Arc<dyn Erc20Token>;
    fn confirmations(&self) -> Arc<dyn Confirmations>;
}
