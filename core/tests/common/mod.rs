//! In-memory stand-ins for the wallet, the pool and its tokens.
//!
//! Every remote call is appended to a shared [`Chain`] log so tests can assert
//! on ordering and on "no remote call was made".

#![allow(dead_code)]

use async_trait::async_trait;
use polylend_core::{
    Address, AssetDeployment, AssetId, AssetInfo, Confirmations, ContractFactory, Deployment,
    Erc20Token, LendingPool, MarketBook, RawMarketData, RemoteError, Session, TxHash, TxOutcome,
    WalletProvider, U256,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub const POOL: Address = Address::with_last_byte(0xAA);
pub const USER: Address = Address::with_last_byte(0x42);

pub fn token_address(asset: AssetId) -> Address {
    match asset {
        AssetId::Usdc => Address::with_last_byte(0x01),
        AssetId::Dai => Address::with_last_byte(0x02),
        AssetId::Weth => Address::with_last_byte(0x03),
    }
}

/// Hash of the n-th transaction submitted on a [`Chain`], starting at 1.
pub fn tx(n: u8) -> TxHash {
    TxHash::with_last_byte(n)
}

pub fn usdc(whole: u64) -> U256 {
    U256::from(whole) * U256::from(1_000_000u64)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RequestAccounts,
    ChainId,
    Decimals(Address),
    BalanceOf(Address),
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    Supply(Address, U256),
    Withdraw(Address, U256),
    Borrow(Address, U256),
    Repay(Address, U256),
    UserSupply(Address),
    UserBorrow(Address),
    HealthFactor,
    MarketData(Address),
    Wait(TxHash),
}

impl Call {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Call::Approve { .. }
                | Call::Supply(..)
                | Call::Withdraw(..)
                | Call::Borrow(..)
                | Call::Repay(..)
        )
    }
}

/// Shared call log and transaction counter.
#[derive(Default)]
pub struct Chain {
    calls: Mutex<Vec<Call>>,
    next_tx: AtomicU8,
}

impl Chain {
    pub fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    pub fn count_of(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn submit(&self, call: Call) -> TxHash {
        self.record(call);
        tx(self.next_tx.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct PoolState {
    pub supplied: HashMap<Address, U256>,
    pub borrowed: HashMap<Address, U256>,
    /// Assets whose position reads fail.
    pub broken_positions: HashSet<Address>,
    /// Assets without an entry fail `getMarketData`.
    pub markets: HashMap<Address, RawMarketData>,
    /// `None` makes `getHealthFactor` fail.
    pub health: Option<U256>,
    /// Returned by every pool write when set.
    pub write_error: Option<RemoteError>,
}

pub struct FakePool {
    chain: Arc<Chain>,
    pub state: Mutex<PoolState>,
}

impl FakePool {
    pub fn new(chain: Arc<Chain>, state: PoolState) -> Self {
        Self {
            chain,
            state: Mutex::new(state),
        }
    }

    fn write(&self, call: Call) -> Result<TxHash, RemoteError> {
        if let Some(err) = self.state.lock().unwrap().write_error.clone() {
            self.chain.record(call);
            return Err(err);
        }

        {
            let mut state = self.state.lock().unwrap();
            match &call {
                Call::Supply(asset, amount) => {
                    *state.supplied.entry(*asset).or_default() += *amount;
                    let market = state.markets.entry(*asset).or_default();
                    market.total_supplied += *amount;
                    market.available_liquidity += *amount;
                }
                Call::Withdraw(asset, amount) => {
                    let s = state.supplied.entry(*asset).or_default();
                    *s = s.saturating_sub(*amount);
                    let market = state.markets.entry(*asset).or_default();
                    market.total_supplied = market.total_supplied.saturating_sub(*amount);
                    market.available_liquidity = market.available_liquidity.saturating_sub(*amount);
                }
                Call::Borrow(asset, amount) => {
                    *state.borrowed.entry(*asset).or_default() += *amount;
                    let market = state.markets.entry(*asset).or_default();
                    market.total_borrowed += *amount;
                    market.available_liquidity = market.available_liquidity.saturating_sub(*amount);
                }
                Call::Repay(asset, amount) => {
                    let b = state.borrowed.entry(*asset).or_default();
                    *b = b.saturating_sub(*amount);
                    let market = state.markets.entry(*asset).or_default();
                    market.total_borrowed = market.total_borrowed.saturating_sub(*amount);
                    market.available_liquidity += *amount;
                }
                _ => {}
            }
        }

        Ok(self.chain.submit(call))
    }
}

#[async_trait]
impl LendingPool for FakePool {
    fn address(&self) -> Address {
        POOL
    }

    async fn supply(&self, asset: Address, amount: U256) -> Result<TxHash, RemoteError> {
        self.write(Call::Supply(asset, amount))
    }

    async fn withdraw(&self, asset: Address, amount: U256) -> Result<TxHash, RemoteError> {
        self.write(Call::Withdraw(asset, amount))
    }

    async fn borrow(&self, asset: Address, amount: U256) -> Result<TxHash, RemoteError> {
        self.write(Call::Borrow(asset, amount))
    }

    async fn repay(&self, asset: Address, amount: U256) -> Result<TxHash, RemoteError> {
        self.write(Call::Repay(asset, amount))
    }

    async fn get_user_supply(&self, _user: Address, asset: Address) -> Result<U256, RemoteError> {
        self.chain.record(Call::UserSupply(asset));
        let state = self.state.lock().unwrap();
        if state.broken_positions.contains(&asset) {
            return Err(RemoteError::Other("call exception".to_string()));
        }
        Ok(state.supplied.get(&asset).copied().unwrap_or_default())
    }

    async fn get_user_borrow(&self, _user: Address, asset: Address) -> Result<U256, RemoteError> {
        self.chain.record(Call::UserBorrow(asset));
        let state = self.state.lock().unwrap();
        if state.broken_positions.contains(&asset) {
            return Err(RemoteError::Other("call exception".to_string()));
        }
        Ok(state.borrowed.get(&asset).copied().unwrap_or_default())
    }

    async fn get_health_factor(&self, _user: Address) -> Result<U256, RemoteError> {
        self.chain.record(Call::HealthFactor);
        self.state
            .lock()
            .unwrap()
            .health
            .ok_or_else(|| RemoteError::Reverted("division by zero".to_string()))
    }

    async fn get_market_data(&self, asset: Address) -> Result<RawMarketData, RemoteError> {
        self.chain.record(Call::MarketData(asset));
        self.state
            .lock()
            .unwrap()
            .markets
            .get(&asset)
            .copied()
            .ok_or_else(|| RemoteError::Other("getMarketData not available".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

pub struct FakeToken {
    chain: Arc<Chain>,
    address: Address,
    /// `None` makes `decimals()` fail.
    pub decimals: Mutex<Option<u8>>,
    /// `None` makes `balanceOf` fail.
    pub balance: Mutex<Option<U256>>,
    pub approve_error: Mutex<Option<RemoteError>>,
}

impl FakeToken {
    pub fn new(chain: Arc<Chain>, address: Address, decimals: u8) -> Self {
        Self {
            chain,
            address,
            decimals: Mutex::new(Some(decimals)),
            balance: Mutex::new(Some(U256::ZERO)),
            approve_error: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Erc20Token for FakeToken {
    fn address(&self) -> Address {
        self.address
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash, RemoteError> {
        let call = Call::Approve {
            token: self.address,
            spender,
            amount,
        };
        if let Some(err) = self.approve_error.lock().unwrap().clone() {
            self.chain.record(call);
            return Err(err);
        }
        Ok(self.chain.submit(call))
    }

    async fn decimals(&self) -> Result<u8, RemoteError> {
        self.chain.record(Call::Decimals(self.address));
        self.decimals
            .lock()
            .unwrap()
            .ok_or_else(|| RemoteError::Other("decimals() reverted".to_string()))
    }

    async fn balance_of(&self, _owner: Address) -> Result<U256, RemoteError> {
        self.chain.record(Call::BalanceOf(self.address));
        self.balance
            .lock()
            .unwrap()
            .ok_or_else(|| RemoteError::Other("balanceOf failed".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Confirmations
// ---------------------------------------------------------------------------

pub enum ConfirmMode {
    Instant,
    /// Never confirms.
    Hang,
    /// Each wait consumes one permit.
    Gated(Arc<Semaphore>),
}

pub struct FakeConfirmations {
    chain: Arc<Chain>,
    pub mode: Mutex<ConfirmMode>,
    pub reverted: Mutex<HashSet<TxHash>>,
    pub failing: Mutex<HashSet<TxHash>>,
}

impl FakeConfirmations {
    pub fn new(chain: Arc<Chain>) -> Self {
        Self {
            chain,
            mode: Mutex::new(ConfirmMode::Instant),
            reverted: Mutex::new(HashSet::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn gate(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.mode.lock().unwrap() = ConfirmMode::Gated(Arc::clone(&gate));
        gate
    }
}

#[async_trait]
impl Confirmations for FakeConfirmations {
    async fn wait(&self, tx: TxHash) -> Result<TxOutcome, RemoteError> {
        self.chain.record(Call::Wait(tx));

        let gate = match &*self.mode.lock().unwrap() {
            ConfirmMode::Instant => None,
            ConfirmMode::Hang => Some(None),
            ConfirmMode::Gated(gate) => Some(Some(Arc::clone(gate))),
        };
        match gate {
            None => {}
            Some(None) => std::future::pending::<()>().await,
            Some(Some(gate)) => {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }
        }

        if self.failing.lock().unwrap().contains(&tx) {
            return Err(RemoteError::Other("receipt lookup failed".to_string()));
        }
        if self.reverted.lock().unwrap().contains(&tx) {
            Ok(TxOutcome::Reverted)
        } else {
            Ok(TxOutcome::Confirmed)
        }
    }
}

// ---------------------------------------------------------------------------
// Wallet and factory
// ---------------------------------------------------------------------------

pub struct FakeWallet {
    chain: Arc<Chain>,
    pub accounts: Mutex<Result<Vec<Address>, RemoteError>>,
    pub chain_id: Mutex<Result<u64, RemoteError>>,
}

impl FakeWallet {
    pub fn new(chain: Arc<Chain>) -> Self {
        Self {
            chain,
            accounts: Mutex::new(Ok(vec![USER])),
            chain_id: Mutex::new(Ok(80002)),
        }
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, RemoteError> {
        self.chain.record(Call::RequestAccounts);
        self.accounts.lock().unwrap().clone()
    }

    async fn chain_id(&self) -> Result<u64, RemoteError> {
        self.chain.record(Call::ChainId);
        self.chain_id.lock().unwrap().clone()
    }
}

pub struct FakeFactory {
    pub pool: Arc<FakePool>,
    pub tokens: HashMap<Address, Arc<FakeToken>>,
    pub confirmations: Arc<FakeConfirmations>,
    /// Every (contract, signer) pair a handle was built for.
    pub bindings: Mutex<Vec<(Address, Option<Address>)>>,
}

impl ContractFactory for FakeFactory {
    fn lending_pool(&self, address: Address, signer: Option<Address>) -> Arc<dyn LendingPool> {
        self.bindings.lock().unwrap().push((address, signer));
        self.pool.clone()
    }

    fn token(&self, address: Address, signer: Option<Address>) -> Arc<dyn Erc20Token> {
        self.bindings.lock().unwrap().push((address, signer));
        match self.tokens.get(&address) {
            Some(token) => token.clone(),
            // Unknown tokens behave like a contract that is not deployed.
            None => {
                let chain = self.pool.chain.clone();
                let token = FakeToken::new(chain, address, 18);
                *token.decimals.lock().unwrap() = None;
                Arc::new(token)
            }
        }
    }

    fn confirmations(&self) -> Arc<dyn Confirmations> {
        self.confirmations.clone()
    }
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// A pool listing USDC (6), DAI (18) and WETH (18) with some liquidity.
pub struct Fixture {
    pub chain: Arc<Chain>,
    pub pool: Arc<FakePool>,
    pub tokens: BTreeMap<AssetId, Arc<FakeToken>>,
    pub confirmations: Arc<FakeConfirmations>,
}

impl Fixture {
    pub fn new() -> Self {
        let chain = Arc::new(Chain::default());

        let mut state = PoolState {
            health: Some(U256::from(1_500_000_000_000_000_000u128)),
            ..Default::default()
        };
        for asset in AssetId::ALL {
            state.markets.insert(
                token_address(asset),
                RawMarketData {
                    total_supplied: U256::from(10u64).pow(U256::from(asset.conventional_decimals() + 3)),
                    total_borrowed: U256::ZERO,
                    supply_rate: U256::from(35_000_000_000_000_000u64),
                    borrow_rate: U256::from(42_000_000_000_000_000u64),
                    available_liquidity: U256::from(500u64)
                        * U256::from(10u64).pow(U256::from(asset.conventional_decimals())),
                },
            );
        }

        let tokens = AssetId::ALL
            .into_iter()
            .map(|asset| {
                (
                    asset,
                    Arc::new(FakeToken::new(
                        chain.clone(),
                        token_address(asset),
                        asset.conventional_decimals(),
                    )),
                )
            })
            .collect();

        Self {
            pool: Arc::new(FakePool::new(chain.clone(), state)),
            confirmations: Arc::new(FakeConfirmations::new(chain.clone())),
            tokens,
            chain,
        }
    }

    pub fn info(asset: AssetId) -> AssetInfo {
        AssetInfo {
            id: asset,
            token: token_address(asset),
            decimals: asset.conventional_decimals(),
        }
    }

    /// A session over every listed asset.
    pub fn session(&self) -> Session {
        self.session_for(&AssetId::ALL)
    }

    pub fn session_for(&self, assets: &[AssetId]) -> Session {
        let mut session = Session::new(USER, self.pool.clone(), self.confirmations.clone());
        for asset in assets {
            session = session.with_asset(Self::info(*asset), self.tokens[asset].clone());
        }
        session
    }

    pub fn token(&self, asset: AssetId) -> &FakeToken {
        &self.tokens[&asset]
    }

    pub fn factory(&self) -> FakeFactory {
        FakeFactory {
            pool: self.pool.clone(),
            tokens: self
                .tokens
                .iter()
                .map(|(asset, token)| (token_address(*asset), token.clone()))
                .collect(),
            confirmations: self.confirmations.clone(),
            bindings: Mutex::new(Vec::new()),
        }
    }

    pub fn deployment(&self) -> Deployment {
        Deployment {
            pool: POOL,
            chain_id: None,
            rate_decimals: 18,
            assets: AssetId::ALL
                .into_iter()
                .map(|asset| AssetDeployment {
                    asset,
                    token: token_address(asset),
                    decimals: None,
                })
                .collect(),
        }
    }

    /// Market book as a caller would hold it after a refresh. Does not touch
    /// the call log.
    pub async fn market_book(&self) -> MarketBook {
        let book =
            polylend_core::load_markets(self.pool.as_ref(), self.session().assets(), 18).await;
        self.chain.clear();
        book
    }
}
