use serde::{Deserialize, Serialize};

use crate::store::{Store, StoreError};
use crate::types::MiningRecord;

/// Storage key prefix for player accounts.
pub const ACCOUNT_KEY_PREFIX: &str = "player:";

/// Everything persisted for one player: the balance ledger plus both
/// session machines' timing state. The whole account serializes as a
/// single value so a balance credit and its timestamp advance commit in
/// one write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAccount {
    pub wallet_address: String,
    pub balance: u64,
    #[serde(default)]
    pub mining: Option<MiningRecord>,
    #[serde(default)]
    pub arcade_cooldown_end_ms: Option<u64>,
}

impl PlayerAccount {
    pub fn new(wallet_address: impl Into<String>) -> Self {
        Self {
            wallet_address: wallet_address.into(),
            balance: 0,
            mining: None,
            arcade_cooldown_end_ms: None,
        }
    }

    /// Credits earned tokens. The only balance mutation in the system;
    /// nothing ever decrements.
    pub fn credit(&mut self, amount: u64) {
        self.balance += amount;
    }
}

pub fn account_key(session_id: &str) -> String {
    format!("{}{}", ACCOUNT_KEY_PREFIX, session_id)
}

/// Loads an account. An unparsable stored value is treated as absent so a
/// corrupt record degrades to a fresh Idle state instead of a hard failure.
pub fn load_account(
    store: &dyn Store,
    session_id: &str,
) -> Result<Option<PlayerAccount>, StoreError> {
    let raw = match store.get(&account_key(session_id))? {
        Some(raw) => raw,
        None => return Ok(None),
    };
    Ok(serde_json::from_str(&raw).ok())
}

/// Persists the whole account in one write.
pub fn save_account(
    store: &dyn Store,
    session_id: &str,
    account: &PlayerAccount,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(account)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    store.put(&account_key(session_id), &raw)
}
