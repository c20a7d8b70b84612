//! Snapshots read from the lending pool.
//!
//! Every type here is a full-replace reading of remote state. Nothing is
//! merged with a previous value and nothing is updated optimistically after a
//! transaction; the next refresh simply produces a new snapshot.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::amount::{format_percent, format_units};
use crate::asset::AssetId;

/// Health factors are WAD-scaled on chain.
pub const HEALTH_FACTOR_DECIMALS: u8 = 18;

const WAD: u128 = 1_000_000_000_000_000_000;

/// A mutating action against the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Supply,
    Withdraw,
    Borrow,
    Repay,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Supply, Action::Withdraw, Action::Borrow, Action::Repay];

    /// Supply and repay move tokens into the pool and need an allowance first.
    pub fn requires_approval(&self) -> bool {
        matches!(self, Action::Supply | Action::Repay)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::Supply => "Supply",
            Action::Withdraw => "Withdraw",
            Action::Borrow => "Borrow",
            Action::Repay => "Repay",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            Action::Supply => "supplied",
            Action::Withdraw => "withdrew",
            Action::Borrow => "borrowed",
            Action::Repay => "repaid",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label().to_lowercase())
    }
}

/// The connected account's position in one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountPosition {
    pub asset: AssetId,
    pub decimals: u8,
    pub supplied: U256,
    pub borrowed: U256,
    /// Token balance held in the wallet, `None` when the read failed.
    pub wallet_balance: Option<U256>,
}

impl AccountPosition {
    pub fn empty(asset: AssetId, decimals: u8) -> Self {
        Self {
            asset,
            decimals,
            supplied: U256::ZERO,
            borrowed: U256::ZERO,
            wallet_balance: None,
        }
    }

    pub fn supplied_display(&self, places: usize) -> String {
        format_units(self.supplied, self.decimals, places)
    }

    pub fn borrowed_display(&self, places: usize) -> String {
        format_units(self.borrowed, self.decimals, places)
    }

    pub fn wallet_display(&self, places: usize) -> Option<String> {
        self.wallet_balance
            .map(|b| format_units(b, self.decimals, places))
    }
}

/// Aggregate solvency metric for the connected account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthFactor {
    /// WAD-scaled ratio.
    Finite(U256),
    /// No debt, or the value could not be read. Displayed as infinite headroom.
    NoRisk,
}

/// Display bucket for a health factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Healthy,
    Caution,
    AtRisk,
}

impl HealthFactor {
    /// Interpret the raw contract value. Zero and `U256::MAX` are the
    /// contract's "no position" sentinels.
    pub fn from_raw(raw: U256) -> Self {
        if raw.is_zero() || raw == U256::MAX {
            HealthFactor::NoRisk
        } else {
            HealthFactor::Finite(raw)
        }
    }

    pub fn display(&self) -> String {
        match self {
            HealthFactor::Finite(raw) => format_units(*raw, HEALTH_FACTOR_DECIMALS, 2),
            HealthFactor::NoRisk => "∞".to_string(),
        }
    }

    pub fn risk(&self) -> RiskLevel {
        match self {
            HealthFactor::NoRisk => RiskLevel::Healthy,
            HealthFactor::Finite(raw) => {
                if *raw >= U256::from(2 * WAD) {
                    RiskLevel::Healthy
                } else if *raw >= U256::from(WAD * 12 / 10) {
                    RiskLevel::Caution
                } else {
                    RiskLevel::AtRisk
                }
            }
        }
    }
}

/// Everything the account loader reads in one refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountState {
    pub account: Address,
    pub positions: BTreeMap<AssetId, AccountPosition>,
    pub health: HealthFactor,
}

impl AccountState {
    pub fn position(&self, asset: AssetId) -> Option<&AccountPosition> {
        self.positions.get(&asset)
    }
}

/// Raw tuple returned by `getMarketData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawMarketData {
    pub total_supplied: U256,
    pub total_borrowed: U256,
    pub supply_rate: U256,
    pub borrow_rate: U256,
    pub available_liquidity: U256,
}

/// Pool statistics for one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketSnapshot {
    pub asset: AssetId,
    pub decimals: u8,
    pub rate_decimals: u8,
    pub total_supplied: U256,
    pub total_borrowed: U256,
    pub supply_rate: U256,
    pub borrow_rate: U256,
    pub available_liquidity: U256,
}

impl MarketSnapshot {
    pub fn from_raw(asset: AssetId, decimals: u8, rate_decimals: u8, raw: RawMarketData) -> Self {
        Self {
            asset,
            decimals,
            rate_decimals,
            total_supplied: raw.total_supplied,
            total_borrowed: raw.total_borrowed,
            supply_rate: raw.supply_rate,
            borrow_rate: raw.borrow_rate,
            available_liquidity: raw.available_liquidity,
        }
    }

    pub fn supply_apy(&self) -> String {
        format_percent(self.supply_rate, self.rate_decimals)
    }

    pub fn borrow_apy(&self) -> String {
        format_percent(self.borrow_rate, self.rate_decimals)
    }

    pub fn amount_display(&self, value: U256, places: usize) -> String {
        format_units(value, self.decimals, places)
    }
}

/// A market reading, or the explicit absence of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketData {
    Live(MarketSnapshot),
    Unavailable { reason: String },
}

impl MarketData {
    pub fn snapshot(&self) -> Option<&MarketSnapshot> {
        match self {
            MarketData::Live(snapshot) => Some(snapshot),
            MarketData::Unavailable { .. } => None,
        }
    }
}

/// Market state for every listed asset from one refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketBook {
    markets: BTreeMap<AssetId, MarketData>,
}

impl MarketBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset: AssetId, data: MarketData) {
        self.markets.insert(asset, data);
    }

    pub fn get(&self, asset: AssetId) -> Option<&MarketData> {
        self.markets.get(&asset)
    }

    /// Liquidity from the last live snapshot, if there is one.
    pub fn available_liquidity(&self, asset: AssetId) -> Option<U256> {
        self.get(asset)
            .and_then(MarketData::snapshot)
            .map(|s| s.available_liquidity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetId, &MarketData)> {
        self.markets.iter()
    }

    pub fn live_count(&self) -> usize {
        self.markets
            .values()
            .filter(|m| matches!(m, MarketData::Live(_)))
            .count()
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}
