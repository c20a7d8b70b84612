//! Application state: plain data, no async, no Arc.
//!
//! `AppState` holds everything the UI needs to render. The service task sends
//! `ServiceEvent`s which are applied via `AppState::apply()`. The UI reads
//! fields directly, with no locking and no channels.

use alloy_primitives::Address;
use chrono::{DateTime, Local};
use polylend_core::{
    short_address, AccountState, Action, AssetId, HealthFactor, MarketBook, RiskLevel,
};
use std::collections::{BTreeMap, BTreeSet};

use crate::events::ServiceEvent;

/// Notices kept for the activity panel.
const MAX_NOTICES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// One line in the activity panel.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub at: DateTime<Local>,
}

/// All application state needed for rendering.
#[derive(Debug)]
pub struct AppState {
    // -- Wallet --
    pub account: Option<Address>,
    pub chain_id: Option<u64>,
    pub connecting: bool,
    /// (expected, actual) after a connect on the wrong chain.
    pub wrong_network: Option<(u64, u64)>,

    // -- Remote data --
    pub positions: Option<AccountState>,
    pub markets: MarketBook,
    pub last_refresh: Option<DateTime<Local>>,

    // -- Actions --
    /// Amount input per asset and action, exactly as typed.
    pub amounts: BTreeMap<(AssetId, Action), String>,
    /// Actions submitted and not yet finished.
    pub pending: BTreeSet<(AssetId, Action)>,

    // -- Notifications --
    pub notices: Vec<Notice>,

    // -- Display preferences --
    pub decimal_places: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            account: None,
            chain_id: None,
            connecting: false,
            wrong_network: None,
            positions: None,
            markets: MarketBook::new(),
            last_refresh: None,
            amounts: BTreeMap::new(),
            pending: BTreeSet::new(),
            notices: Vec::new(),
            decimal_places: 2,
        }
    }
}

impl AppState {
    pub fn with_decimal_places(decimal_places: usize) -> Self {
        Self {
            decimal_places,
            ..Self::default()
        }
    }

    /// Apply a service event to the state.
    pub fn apply(&mut self, event: ServiceEvent) {
        match event {
            ServiceEvent::Connected { account, chain_id } => {
                self.account = Some(account);
                self.chain_id = chain_id;
                self.connecting = false;
                self.wrong_network = None;
            }

            ServiceEvent::Disconnected => {
                self.account = None;
                self.chain_id = None;
                self.connecting = false;
                self.positions = None;
                self.pending.clear();
            }

            ServiceEvent::WrongNetwork { expected, actual } => {
                self.connecting = false;
                self.wrong_network = Some((expected, actual));
                self.push_notice(
                    NoticeKind::Error,
                    format!(
                        "Wrong network: wallet is on chain {}, PolyLend is on chain {}",
                        actual, expected
                    ),
                );
            }

            ServiceEvent::AccountUpdated(account) => {
                // Late results for a session that has since been dropped.
                if self.account == Some(account.account) {
                    self.positions = Some(account);
                }
            }

            ServiceEvent::MarketsUpdated(markets) => {
                self.markets = markets;
                self.last_refresh = Some(Local::now());
            }

            ServiceEvent::ActionStarted { asset, action } => {
                self.pending.insert((asset, action));
            }

            ServiceEvent::ActionSucceeded {
                asset,
                action,
                message,
            } => {
                self.pending.remove(&(asset, action));
                self.amounts.remove(&(asset, action));
                self.push_notice(NoticeKind::Success, message);
            }

            ServiceEvent::ActionFailed {
                asset,
                action,
                error,
            } => {
                self.pending.remove(&(asset, action));
                self.push_notice(NoticeKind::Error, format!("{} failed: {}", action.label(), error));
            }

            ServiceEvent::Error(msg) => {
                self.connecting = false;
                self.push_notice(NoticeKind::Error, msg);
            }
        }
    }

    fn push_notice(&mut self, kind: NoticeKind, message: String) {
        self.notices.push(Notice {
            kind,
            message,
            at: Local::now(),
        });
        if self.notices.len() > MAX_NOTICES {
            self.notices.remove(0);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn is_pending(&self, asset: AssetId, action: Action) -> bool {
        self.pending.contains(&(asset, action))
    }

    /// `0x1234...abcd` for the header.
    pub fn account_label(&self) -> Option<String> {
        self.account.as_ref().map(short_address)
    }

    pub fn health(&self) -> Option<HealthFactor> {
        self.positions.as_ref().map(|p| p.health)
    }

    pub fn health_label(&self) -> String {
        self.health()
            .map_or_else(|| "-".to_string(), |h| h.display())
    }

    pub fn health_risk(&self) -> Option<RiskLevel> {
        self.health().map(|h| h.risk())
    }

    pub fn amount_input(&mut self, asset: AssetId, action: Action) -> &mut String {
        self.amounts.entry((asset, action)).or_default()
    }
}
