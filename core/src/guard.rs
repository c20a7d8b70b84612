//! Per-(asset, action) double-submission guard.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::asset::AssetId;
use crate::error::ActionError;
use crate::model::Action;

type Key = (AssetId, Action);

/// Tracks which (asset, action) pairs have an action outstanding.
#[derive(Debug, Clone, Default)]
pub struct InFlightGuard {
    active: Arc<Mutex<HashSet<Key>>>,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for `(asset, action)`. The slot is released when the
    /// returned ticket is dropped.
    pub fn try_acquire(&self, asset: AssetId, action: Action) -> Result<InFlightTicket, ActionError> {
        let mut active = self
            .active
            .lock()
            .map_err(|_| ActionError::Unknown("in-flight registry poisoned".to_string()))?;

        if !active.insert((asset, action)) {
            return Err(ActionError::ActionInProgress { asset, action });
        }

        Ok(InFlightTicket {
            key: (asset, action),
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_active(&self, asset: AssetId, action: Action) -> bool {
        self.active
            .lock()
            .map(|a| a.contains(&(asset, action)))
            .unwrap_or(false)
    }
}

/// Proof that an action holds its slot.
#[derive(Debug)]
pub struct InFlightTicket {
    key: Key,
    active: Arc<Mutex<HashSet<Key>>>,
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        if let Ok(mut active) = self.active.lock() {
            active.remove(&self.key);
        }
    }
}
