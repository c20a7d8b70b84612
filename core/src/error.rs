use alloy_primitives::TxHash;
use thiserror::Error;

use crate::amount::AmountError;
use crate::asset::AssetId;
use crate::model::Action;

/// Failure reported by a wallet provider or contract handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("wallet provider unavailable: {0}")]
    Unavailable(String),

    #[error("request rejected by user")]
    Rejected,

    #[error("execution reverted: {0}")]
    Reverted(String),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("No wallet provider found ({0}). Start a wallet or check the RPC endpoint.")]
    NoWalletProvider(String),

    #[error("Wallet connection was rejected")]
    ConnectionRejected,

    #[error("Wrong network: expected chain {expected}, wallet is on chain {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("Cannot verify the wallet is on chain {expected}: {reason}")]
    NetworkUnverified { expected: u64, reason: String },

    #[error("Precision for {0} is unavailable: {1}")]
    PrecisionUnavailable(AssetId, String),

    #[error("Remote error: {0}")]
    Remote(String),
}

/// Which step of an action a pending transaction belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStage {
    Approve,
    Execute,
}

impl std::fmt::Display for TxStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxStage::Approve => f.write_str("approval"),
            TxStage::Execute => f.write_str("transaction"),
        }
    }
}

/// Everything a user-initiated action can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("Insufficient liquidity: requested {requested} {asset}, pool has {available}")]
    InsufficientLiquidity {
        asset: AssetId,
        requested: String,
        available: String,
    },

    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("Transaction reverted ({0}). Check your collateral and borrow capacity.")]
    ExecutionReverted(String),

    #[error("A {action} of {asset} is already in progress")]
    ActionInProgress { asset: AssetId, action: Action },

    #[error("Timed out waiting for {stage} {tx} to confirm; it may still confirm later")]
    ConfirmationTimeout { stage: TxStage, tx: TxHash },

    #[error("{0} is not available in this session")]
    UnknownAsset(AssetId),

    #[error("{0}")]
    Unknown(String),
}

impl ActionError {
    /// Classify a failure of the main contract call.
    pub(crate) fn from_execution(err: RemoteError) -> Self {
        match err {
            RemoteError::Reverted(reason) => ActionError::ExecutionReverted(reason),
            other => ActionError::Unknown(other.to_string()),
        }
    }
}
