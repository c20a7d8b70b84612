//! Action Orchestrator: supply, withdraw, borrow and repay.
//!
//! Each action is a short fixed sequence:
//!
//! - supply / repay: `approve` → wait → pool call → wait → refresh
//! - borrow / withdraw: (liquidity pre-check for borrow) → pool call → wait → refresh
//!
//! Input validation and the borrow liquidity check happen before any remote
//! call. If the approval fails the pool call is never issued; if the pool
//! call fails after a successful approval the allowance is left in place.

use alloy_primitives::{TxHash, U256};
use std::time::Duration;

use crate::amount::{format_exact, format_units, parse_amount};
use crate::asset::AssetId;
use crate::contract::TxOutcome;
use crate::error::{ActionError, TxStage};
use crate::guard::InFlightGuard;
use crate::loader::{load_account, load_markets};
use crate::model::{AccountState, Action, MarketBook};
use crate::session::Session;

/// A user's request, exactly as entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub asset: AssetId,
    pub action: Action,
    pub amount: String,
}

impl ActionRequest {
    pub fn new(asset: AssetId, action: Action, amount: impl Into<String>) -> Self {
        Self {
            asset,
            action,
            amount: amount.into(),
        }
    }
}

/// A confirmed action and the state re-read after it.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub asset: AssetId,
    pub action: Action,
    /// Amount submitted, in smallest units.
    pub amount: U256,
    /// Every transaction the action sent, in order.
    pub transactions: Vec<TxHash>,
    pub account: AccountState,
    pub markets: MarketBook,
}

impl ActionOutcome {
    pub fn summary(&self, decimals: u8) -> String {
        format!(
            "Successfully {} {} {}",
            self.action.past_tense(),
            format_exact(self.amount, decimals),
            self.asset
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActionOrchestrator {
    guard: InFlightGuard,
    confirmation_timeout: Option<Duration>,
}

impl ActionOrchestrator {
    /// `confirmation_timeout` bounds each wait for a transaction to be mined.
    /// `None` waits indefinitely.
    pub fn new(confirmation_timeout: Option<Duration>) -> Self {
        Self {
            guard: InFlightGuard::new(),
            confirmation_timeout,
        }
    }

    pub fn guard(&self) -> &InFlightGuard {
        &self.guard
    }

    /// Run one action to completion.
    ///
    /// `markets` is the last market book the caller has seen; it is only used
    /// for the borrow liquidity pre-check.
    pub async fn execute(
        &self,
        session: &Session,
        markets: &MarketBook,
        request: ActionRequest,
    ) -> Result<ActionOutcome, ActionError> {
        let info = *session
            .asset(request.asset)
            .ok_or(ActionError::UnknownAsset(request.asset))?;
        let amount = parse_amount(&request.amount, info.decimals)?;

        if request.action == Action::Borrow {
            if let Some(available) = markets.available_liquidity(info.id) {
                if amount > available {
                    return Err(ActionError::InsufficientLiquidity {
                        asset: info.id,
                        requested: format_units(amount, info.decimals, 2),
                        available: format_units(available, info.decimals, 2),
                    });
                }
            }
        }

        let _ticket = self.guard.try_acquire(info.id, request.action)?;
        let pool = session.pool();
        let mut transactions = Vec::with_capacity(2);

        if request.action.requires_approval() {
            let token = session
                .token(info.id)
                .ok_or(ActionError::UnknownAsset(info.id))?;

            log::info!("📝 Approving {} {} for the pool", request.amount.trim(), info.id);
            let approval = token
                .approve(pool.address(), amount)
                .await
                .map_err(|e| ActionError::AuthorizationFailed(e.to_string()))?;
            self.confirm(session, approval, TxStage::Approve).await?;
            log::info!("✅ Approval confirmed: {}", approval);
            transactions.push(approval);
        }

        log::info!("📤 {} {} {}", request.action.label(), request.amount.trim(), info.id);
        let submitted = match request.action {
            Action::Supply => pool.supply(info.token, amount).await,
            Action::Withdraw => pool.withdraw(info.token, amount).await,
            Action::Borrow => pool.borrow(info.token, amount).await,
            Action::Repay => pool.repay(info.token, amount).await,
        }
        .map_err(ActionError::from_execution)?;
        self.confirm(session, submitted, TxStage::Execute).await?;
        log::info!("✅ {} confirmed: {}", request.action.label(), submitted);
        transactions.push(submitted);

        let account = load_account(session).await;
        let markets = load_markets(pool.as_ref(), session.assets(), session.rate_decimals()).await;

        Ok(ActionOutcome {
            asset: info.id,
            action: request.action,
            amount,
            transactions,
            account,
            markets,
        })
    }

    async fn confirm(
        &self,
        session: &Session,
        tx: TxHash,
        stage: TxStage,
    ) -> Result<(), ActionError> {
        let wait = session.confirmations().wait(tx);
        let result = match self.confirmation_timeout {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| ActionError::ConfirmationTimeout { stage, tx })?,
            None => wait.await,
        };

        match (stage, result) {
            (_, Ok(TxOutcome::Confirmed)) => Ok(()),
            (TxStage::Approve, Ok(TxOutcome::Reverted)) => Err(ActionError::AuthorizationFailed(
                format!("approval {} reverted", tx),
            )),
            (TxStage::Approve, Err(e)) => Err(ActionError::AuthorizationFailed(e.to_string())),
            (TxStage::Execute, Ok(TxOutcome::Reverted)) => Err(ActionError::ExecutionReverted(
                format!("{} reverted on chain", tx),
            )),
            (TxStage::Execute, Err(e)) => Err(ActionError::from_execution(e)),
        }
    }
}
