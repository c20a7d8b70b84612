//! Typed contract handles over the JSON-RPC client.
//!
//! Calldata is produced and decoded with `alloy-sol-types`; the handles only
//! decide whether a call is a read (`eth_call`) or a write
//! (`eth_sendTransaction` from the bound signer).

use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use polylend_core::{
    Confirmations, ContractFactory, Erc20Token, LendingPool, RawMarketData, RemoteError,
};
use std::sync::Arc;

use crate::rpc_client::EvmRpcClient;

sol! {
    interface ILendingPool {
        function supply(address asset, uint256 amount) external;
        function withdraw(address asset, uint256 amount) external;
        function borrow(address asset, uint256 amount) external;
        function repay(address asset, uint256 amount) external;
        function getUserSupply(address user, address asset) external view returns (uint256);
        function getUserBorrow(address user, address asset) external view returns (uint256);
        function getHealthFactor(address user) external view returns (uint256);
        function getMarketData(address asset) external view returns (
            uint256 totalSupplied,
            uint256 totalBorrowed,
            uint256 supplyRate,
            uint256 borrowRate,
            uint256 availableLiquidity
        );
    }

    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address owner) external view returns (uint256);
        function decimals() external view returns (uint8);
    }
}

/// Shared plumbing for one deployed contract.
#[derive(Debug, Clone)]
struct Handle {
    client: Arc<EvmRpcClient>,
    address: Address,
    signer: Option<Address>,
}

impl Handle {
    async fn read<C: SolCall>(&self, call: C) -> Result<C::Return, RemoteError> {
        let data = self
            .client
            .call(self.address, Bytes::from(call.abi_encode()), self.signer)
            .await?;
        C::abi_decode_returns(&data, true)
            .map_err(|e| RemoteError::Other(format!("cannot decode {}: {}", C::SIGNATURE, e)))
    }

    async fn write<C: SolCall>(&self, call: C) -> Result<TxHash, RemoteError> {
        let from = self.signer.ok_or_else(|| {
            RemoteError::Other(format!("{} needs a connected wallet", C::SIGNATURE))
        })?;
        log::debug!("✍️ {} on {}", C::SIGNATURE, self.address);
        Ok(self
            .client
            .send_transaction(from, self.address, Bytes::from(call.abi_encode()))
            .await?)
    }
}

pub struct PoolContract {
    handle: Handle,
}

#[async_trait]
impl LendingPool for PoolContract {
    fn address(&self) -> Address {
        self.handle.address
    }

    async fn supply(&self, asset: Address, amount: U256) -> Result<TxHash, RemoteError> {
        self.handle
            .write(ILendingPool::supplyCall { asset, amount })
            .await
    }

    async fn withdraw(&self, asset: Address, amount: U256) -> Result<TxHash, RemoteError> {
        self.handle
            .write(ILendingPool::withdrawCall { asset, amount })
            .await
    }

    async fn borrow(&self, asset: Address, amount: U256) -> Result<TxHash, RemoteError> {
        self.handle
            .write(ILendingPool::borrowCall { asset, amount })
            .await
    }

    async fn repay(&self, asset: Address, amount: U256) -> Result<TxHash, RemoteError> {
        self.handle
            .write(ILendingPool::repayCall { asset, amount })
            .await
    }

    async fn get_user_supply(&self, user: Address, asset: Address) -> Result<U256, RemoteError> {
        let ret = self
            .handle
            .read(ILendingPool::getUserSupplyCall { user, asset })
            .await?;
        Ok(ret._0)
    }

    async fn get_user_borrow(&self, user: Address, asset: Address) -> Result<U256, RemoteError> {
        let ret = self
            .handle
            .read(ILendingPool::getUserBorrowCall { user, asset })
            .await?;
        Ok(ret._0)
    }

    async fn get_health_factor(&self, user: Address) -> Result<U256, RemoteError> {
        let ret = self
            .handle
            .read(ILendingPool::getHealthFactorCall { user })
            .await?;
        Ok(ret._0)
    }

    async fn get_market_data(&self, asset: Address) -> Result<RawMarketData, RemoteError> {
        let ret = self
            .handle
            .read(ILendingPool::getMarketDataCall { asset })
            .await?;
        Ok(RawMarketData {
            total_supplied: ret.totalSupplied,
            total_borrowed: ret.totalBorrowed,
            supply_rate: ret.supplyRate,
            borrow_rate: ret.borrowRate,
            available_liquidity: ret.availableLiquidity,
        })
    }
}

pub struct TokenContract {
    handle: Handle,
}

#[async_trait]
impl Erc20Token for TokenContract {
    fn address(&self) -> Address {
        self.handle.address
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash, RemoteError> {
        self.handle
            .write(IERC20::approveCall { spender, amount })
            .await
    }

    async fn decimals(&self) -> Result<u8, RemoteError> {
        Ok(self.handle.read(IERC20::decimalsCall {}).await?._0)
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, RemoteError> {
        Ok(self.handle.read(IERC20::balanceOfCall { owner }).await?._0)
    }
}

/// Builds contract handles that all share one JSON-RPC client.
pub struct RpcContractFactory {
    client: Arc<EvmRpcClient>,
}

impl RpcContractFactory {
    pub fn new(client: Arc<EvmRpcClient>) -> Self {
        Self { client }
    }

    fn handle(&self, address: Address, signer: Option<Address>) -> Handle {
        Handle {
            client: Arc::clone(&self.client),
            address,
            signer,
        }
    }
}

impl ContractFactory for RpcContractFactory {
    fn lending_pool(&self, address: Address, signer: Option<Address>) -> Arc<dyn LendingPool> {
        Arc::new(PoolContract {
            handle: self.handle(address, signer),
        })
    }

    fn token(&self, address: Address, signer: Option<Address>) -> Arc<dyn Erc20Token> {
        Arc::new(TokenContract {
            handle: self.handle(address, signer),
        })
    }

    fn confirmations(&self) -> Arc<dyn Confirmations> {
        self.client.clone()
    }
}
