use axum::{Json, extract::State};
use serde::Serialize;

use engine::account::{ACCOUNT_KEY_PREFIX, PlayerAccount, load_account};
use engine::store::Store;

use crate::{AppState, middleware::AuthUser};

// Only the top 100 wallets are shown, matching the game's leaderboard page
const MAX_ENTRIES: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub wallet_address: String,
    pub balance: u64,
}

#[derive(Serialize)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Serialize)]
pub struct RankResponse {
    pub rank: Option<usize>,
    pub balance: u64,
}

// Leaderboard endpoint: a read-only projection over every persisted
// balance, sorted descending
pub async fn get_leaderboard(State(state): State<AppState>) -> Json<LeaderboardResponse> {
    let entries = ranked_accounts(&state)
        .into_iter()
        .take(MAX_ENTRIES)
        .enumerate()
        .map(|(i, (_, account))| LeaderboardEntry {
            rank: i + 1,
            wallet_address: account.wallet_address,
            balance: account.balance,
        })
        .collect();

    Json(LeaderboardResponse { entries })
}

// Rank endpoint: the caller's own standing, computed over the full ledger
// rather than only the displayed top 100
pub async fn get_rank(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Json<RankResponse> {
    let ranked = ranked_accounts(&state);
    let rank = ranked
        .iter()
        .position(|(session_id, _)| session_id == &user.session_id)
        .map(|i| i + 1);

    Json(RankResponse {
        rank,
        balance: user.balance,
    })
}

// Loads every player account and sorts by balance descending. Records that
// fail to parse are skipped, consistent with corrupt-state recovery
// elsewhere
fn ranked_accounts(state: &AppState) -> Vec<(String, PlayerAccount)> {
    let keys = match state.storage.keys() {
        Ok(keys) => keys,
        Err(e) => {
            tracing::error!("Storage error listing accounts: {}", e);
            return Vec::new();
        }
    };

    let mut accounts: Vec<(String, PlayerAccount)> = keys
        .iter()
        .filter_map(|key| key.strip_prefix(ACCOUNT_KEY_PREFIX))
        .filter_map(|session_id| {
            load_account(&state.storage, session_id)
                .ok()
                .flatten()
                .map(|account| (session_id.to_string(), account))
        })
        .collect();

    accounts.sort_by(|a, b| b.1.balance.cmp(&a.1.balance));
    accounts
}
