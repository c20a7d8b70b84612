//! PolyLend dashboard core
//!
//! Everything between the wallet and the screen that is not transport or
//! rendering:
//! - Fixed asset set with per-deployment precision resolved at connect time
//! - Exact decimal ↔ smallest-unit conversion
//! - Traits for the wallet provider, the lending pool and its tokens
//! - Explicit `Session` object instead of a global connection singleton
//! - Account and market loaders with per-asset failure isolation
//! - Action orchestration with approve-and-wait, a liquidity pre-check and a
//!   per-(asset, action) in-flight guard

pub mod amount;
pub mod asset;
pub mod connection;
pub mod contract;
pub mod error;
pub mod guard;
pub mod loader;
pub mod model;
pub mod orchestrator;
pub mod session;

// Re-export commonly used types
pub use alloy_primitives::{Address, TxHash, U256};
pub use amount::{format_exact, format_percent, format_units, parse_amount, AmountError};
pub use asset::{AssetId, AssetInfo, AssetRegistry, UnknownAssetError};
pub use connection::{AssetDeployment, ConnectionManager, Deployment};
pub use contract::{
    Confirmations, ContractFactory, Erc20Token, LendingPool, TxOutcome, WalletProvider,
};
pub use error::{ActionError, ConnectionError, RemoteError, TxStage};
pub use guard::{InFlightGuard, InFlightTicket};
pub use loader::{load_account, load_markets, load_observed_markets};
pub use model::{
    AccountPosition, AccountState, Action, HealthFactor, MarketBook, MarketData, MarketSnapshot,
    RawMarketData, RiskLevel, HEALTH_FACTOR_DECIMALS,
};
pub use orchestrator::{ActionOrchestrator, ActionOutcome, ActionRequest};
pub use session::{short_address, MarketObserver, Session};
