use engine::account::PlayerAccount;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub session_id: String,
    pub wallet_address: String,
    pub balance: u64,
}

impl AuthenticatedUser {
    pub fn from_account(session_id: &str, account: &PlayerAccount) -> Self {
        Self {
            session_id: session_id.to_string(),
            wallet_address: account.wallet_address.clone(),
            balance: account.balance,
        }
    }
}
