//! Connection Manager: wallet handshake, contract binding, precision lookup.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::asset::{AssetId, AssetInfo, AssetRegistry};
use crate::contract::{ContractFactory, Erc20Token, WalletProvider};
use crate::error::{ConnectionError, RemoteError};
use crate::session::{MarketObserver, Session};

fn default_rate_decimals() -> u8 {
    18
}

/// A listed asset as configured for one deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDeployment {
    pub asset: AssetId,
    pub token: Address,
    /// Fallback precision if the token's `decimals()` cannot be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
}

/// Where the pool and its tokens live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub pool: Address,

    /// Expected chain; connecting on any other chain fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,

    /// Scale of the supply/borrow rates returned by `getMarketData`.
    #[serde(default = "default_rate_decimals")]
    pub rate_decimals: u8,

    pub assets: Vec<AssetDeployment>,
}

/// Builds sessions and read-only observers for one deployment.
pub struct ConnectionManager {
    provider: Arc<dyn WalletProvider>,
    factory: Arc<dyn ContractFactory>,
    deployment: Deployment,
}

impl ConnectionManager {
    pub fn new(
        provider: Arc<dyn WalletProvider>,
        factory: Arc<dyn ContractFactory>,
        deployment: Deployment,
    ) -> Self {
        Self {
            provider,
            factory,
            deployment,
        }
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// Request an account from the wallet and bind every contract to it.
    pub async fn connect(&self) -> Result<Session, ConnectionError> {
        let accounts = self
            .provider
            .request_accounts()
            .await
            .map_err(|e| match e {
                RemoteError::Unavailable(reason) => ConnectionError::NoWalletProvider(reason),
                RemoteError::Rejected => ConnectionError::ConnectionRejected,
                other => ConnectionError::Remote(other.to_string()),
            })?;

        let account = *accounts.first().ok_or(ConnectionError::ConnectionRejected)?;

        let chain_id = match (self.provider.chain_id().await, self.deployment.chain_id) {
            (Ok(id), _) => Some(id),
            // A pinned deployment never signs on a chain it could not check.
            (Err(e), Some(expected)) => {
                return Err(ConnectionError::NetworkUnverified {
                    expected,
                    reason: e.to_string(),
                });
            }
            (Err(e), None) => {
                log::warn!("Could not read chain id: {}", e);
                None
            }
        };
        if let (Some(expected), Some(actual)) = (self.deployment.chain_id, chain_id) {
            if expected != actual {
                return Err(ConnectionError::WrongNetwork { expected, actual });
            }
        }

        let pool = self.factory.lending_pool(self.deployment.pool, Some(account));
        let mut session = Session::new(account, pool, self.factory.confirmations())
            .with_rate_decimals(self.deployment.rate_decimals);
        if let Some(id) = chain_id {
            session = session.with_chain_id(id);
        }

        for asset in &self.deployment.assets {
            let token = self.factory.token(asset.token, Some(account));
            let decimals = resolve_decimals(token.as_ref(), asset).await?;
            session = session.with_asset(
                AssetInfo {
                    id: asset.asset,
                    token: asset.token,
                    decimals,
                },
                token,
            );
        }

        log::info!(
            "🔗 Connected {} ({} assets, chain {})",
            account,
            session.assets().len(),
            chain_id.map_or_else(|| "unknown".to_string(), |id| id.to_string())
        );
        Ok(session)
    }

    /// Read-only handles for showing markets before any wallet is connected.
    pub async fn observe(&self) -> Result<MarketObserver, ConnectionError> {
        let mut assets = AssetRegistry::new();
        for asset in &self.deployment.assets {
            let token = self.factory.token(asset.token, None);
            let decimals = resolve_decimals(token.as_ref(), asset).await?;
            assets.insert(AssetInfo {
                id: asset.asset,
                token: asset.token,
                decimals,
            });
        }

        Ok(MarketObserver {
            pool: self.factory.lending_pool(self.deployment.pool, None),
            assets,
            rate_decimals: self.deployment.rate_decimals,
        })
    }
}

/// The token's own `decimals()` wins; configuration is only a fallback.
async fn resolve_decimals(
    token: &dyn Erc20Token,
    asset: &AssetDeployment,
) -> Result<u8, ConnectionError> {
    match token.decimals().await {
        Ok(on_chain) => {
            if let Some(configured) = asset.decimals {
                if configured != on_chain {
                    log::warn!(
                        "{} configured with {} decimals but token reports {}; using {}",
                        asset.asset,
                        configured,
                        on_chain,
                        on_chain
                    );
                }
            }
            Ok(on_chain)
        }
        Err(e) => match asset.decimals {
            Some(configured) => {
                log::warn!(
                    "decimals() for {} failed ({}), using configured {}",
                    asset.asset,
                    e,
                    configured
                );
                Ok(configured)
            }
            None => Err(ConnectionError::PrecisionUnavailable(
                asset.asset,
                e.to_string(),
            )),
        },
    }
}
