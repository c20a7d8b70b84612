//! Account and market state loaders.
//!
//! Both loaders always produce a complete snapshot. A failed read for one
//! asset degrades only that asset; the refresh as a whole never fails.

use std::collections::BTreeMap;

use crate::asset::AssetRegistry;
use crate::contract::LendingPool;
use crate::model::{
    AccountPosition, AccountState, HealthFactor, MarketBook, MarketData, MarketSnapshot,
};
use crate::session::{MarketObserver, Session};

/// Read the session account's position in every asset plus its health factor.
pub async fn load_account(session: &Session) -> AccountState {
    let account = session.account();
    let pool = session.pool();
    let mut positions = BTreeMap::new();

    for info in session.assets().iter() {
        let supplied = pool.get_user_supply(account, info.token).await;
        let borrowed = pool.get_user_borrow(account, info.token).await;

        let mut position = match (supplied, borrowed) {
            (Ok(supplied), Ok(borrowed)) => AccountPosition {
                asset: info.id,
                decimals: info.decimals,
                supplied,
                borrowed,
                wallet_balance: None,
            },
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("Position read for {} failed, showing zero: {}", info.id, e);
                AccountPosition::empty(info.id, info.decimals)
            }
        };

        if let Some(token) = session.token(info.id) {
            match token.balance_of(account).await {
                Ok(balance) => position.wallet_balance = Some(balance),
                Err(e) => log::warn!("Wallet balance read for {} failed: {}", info.id, e),
            }
        }

        positions.insert(info.id, position);
    }

    let health = match pool.get_health_factor(account).await {
        Ok(raw) => HealthFactor::from_raw(raw),
        Err(e) => {
            log::warn!("Health factor read failed, assuming no risk: {}", e);
            HealthFactor::NoRisk
        }
    };

    log::info!(
        "✅ Account refreshed: {} assets, health factor {}",
        positions.len(),
        health.display()
    );

    AccountState {
        account,
        positions,
        health,
    }
}

/// Read pool statistics for every listed asset. Only needs a read handle.
pub async fn load_markets(
    pool: &dyn LendingPool,
    assets: &AssetRegistry,
    rate_decimals: u8,
) -> MarketBook {
    let mut book = MarketBook::new();

    for info in assets.iter() {
        let data = match pool.get_market_data(info.token).await {
            Ok(raw) => MarketData::Live(MarketSnapshot::from_raw(
                info.id,
                info.decimals,
                rate_decimals,
                raw,
            )),
            Err(e) => {
                log::warn!("Market data for {} unavailable: {}", info.id, e);
                MarketData::Unavailable {
                    reason: e.to_string(),
                }
            }
        };
        book.insert(info.id, data);
    }

    log::info!(
        "✅ Markets refreshed: {}/{} live",
        book.live_count(),
        book.len()
    );
    book
}

/// Convenience wrapper for [`load_markets`] over an observer.
pub async fn load_observed_markets(observer: &MarketObserver) -> MarketBook {
    load_markets(
        observer.pool.as_ref(),
        &observer.assets,
        observer.rate_decimals,
    )
    .await
}
