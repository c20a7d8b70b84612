//! Supported assets and their resolved token metadata.
//!
//! The asset set is fixed at compile time. What varies per deployment is the
//! token address and the precision, which is resolved once when a session is
//! set up and never inferred from the magnitude of a reading.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One of the assets the lending pool lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetId {
    Usdc,
    Dai,
    Weth,
}

impl AssetId {
    /// Every supported asset, in display order.
    pub const ALL: [AssetId; 3] = [AssetId::Usdc, AssetId::Dai, AssetId::Weth];

    pub fn symbol(&self) -> &'static str {
        match self {
            AssetId::Usdc => "USDC",
            AssetId::Dai => "DAI",
            AssetId::Weth => "WETH",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AssetId::Usdc => "USD Coin",
            AssetId::Dai => "Dai Stablecoin",
            AssetId::Weth => "Wrapped Ether",
        }
    }

    /// Precision the token conventionally uses. Only a suggestion for
    /// configuration defaults; the session always uses the resolved value.
    pub fn conventional_decimals(&self) -> u8 {
        match self {
            AssetId::Usdc => 6,
            AssetId::Dai | AssetId::Weth => 18,
        }
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown asset: {0}")]
pub struct UnknownAssetError(pub String);

impl FromStr for AssetId {
    type Err = UnknownAssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetId::ALL
            .into_iter()
            .find(|a| a.symbol().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownAssetError(s.to_string()))
    }
}

/// A listed asset with its token contract and authoritative precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetInfo {
    pub id: AssetId,
    pub token: Address,
    pub decimals: u8,
}

/// Resolved asset table shared by the loaders and the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    assets: BTreeMap<AssetId, AssetInfo>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: AssetInfo) {
        self.assets.insert(info.id, info);
    }

    pub fn get(&self, id: AssetId) -> Option<&AssetInfo> {
        self.assets.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetInfo> {
        self.assets.values()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl FromIterator<AssetInfo> for AssetRegistry {
    fn from_iter<I: IntoIterator<Item = AssetInfo>>(iter: I) -> Self {
        let mut registry = AssetRegistry::new();
        for info in iter {
            registry.insert(info);
        }
        registry
    }
}
