//! Event types for communication between UI and service task.
//!
//! These two enums are the *only* interface between the synchronous egui render
//! loop and the asynchronous service task. No shared state, no Arc, no Mutex.

use alloy_primitives::Address;
use polylend_core::{AccountState, Action, AssetId, MarketBook};

// ============================================================================
// UI → Service
// ============================================================================

/// Commands sent from the UI thread to the background service task.
#[derive(Debug)]
pub enum UiEvent {
    /// Request an account from the wallet provider.
    Connect,

    /// Drop the session. Market data stays on screen.
    Disconnect,

    /// Ask the provider to switch to the configured chain.
    SwitchNetwork,

    /// Re-read account and market state now.
    Refresh,

    /// Run one action with the amount exactly as typed.
    Submit {
        asset: AssetId,
        action: Action,
        amount: String,
    },

    /// Clean shutdown.
    Shutdown,
}

// ============================================================================
// Service → UI
// ============================================================================

/// Events sent from the service task back to the UI thread.
#[derive(Debug)]
pub enum ServiceEvent {
    /// Wallet session established.
    Connected {
        account: Address,
        chain_id: Option<u64>,
    },

    /// Session dropped.
    Disconnected,

    /// Connected to a chain other than the deployment's.
    WrongNetwork { expected: u64, actual: u64 },

    /// Fresh positions and health factor.
    AccountUpdated(AccountState),

    /// Fresh market statistics.
    MarketsUpdated(MarketBook),

    /// An action was accepted and is running.
    ActionStarted { asset: AssetId, action: Action },

    /// An action confirmed; account and market updates follow separately.
    ActionSucceeded {
        asset: AssetId,
        action: Action,
        message: String,
    },

    /// An action failed with a user-facing message.
    ActionFailed {
        asset: AssetId,
        action: Action,
        error: String,
    },

    /// Non-fatal error to display in the UI.
    Error(String),
}
