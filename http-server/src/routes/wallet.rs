use axum::{Json, extract::State, http::StatusCode};
use hex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use engine::account::{PlayerAccount, load_account, save_account};
use engine::clock::Clock;

use crate::{AppState, middleware::AuthUser, models::AuthenticatedUser};

// Connect wallet request
#[derive(Deserialize)]
pub struct ConnectWalletRequest {
    pub wallet_address: String,
}

// Connect wallet response
#[derive(Serialize)]
pub struct ConnectWalletResponse {
    pub success: bool,
    pub message: String,
    pub session_id: Option<String>,
    pub user: Option<AuthenticatedUser>,
}

// Connect wallet endpoint: the identity provider. The wallet address hash
// is both the storage key and the bearer token; connecting the same wallet
// again resumes the existing account.
pub async fn connect_wallet(
    State(state): State<AppState>,
    Json(payload): Json<ConnectWalletRequest>,
) -> (StatusCode, Json<ConnectWalletResponse>) {
    let wallet_address = payload.wallet_address.trim();

    // Validate input
    if wallet_address.is_empty() {
        let response = ConnectWalletResponse {
            success: false,
            message: "Wallet address is required".to_string(),
            session_id: None,
            user: None,
        };
        return (StatusCode::BAD_REQUEST, Json(response));
    }

    // Derive the session id from the wallet address
    let mut hasher = Sha256::new();
    hasher.update(wallet_address.as_bytes());
    let session_id = hex::encode(hasher.finalize());

    // Get or create the account for this wallet
    let account = match load_account(&state.storage, &session_id) {
        Ok(Some(account)) => account,
        Ok(None) => {
            let account = PlayerAccount::new(wallet_address);
            if let Err(e) = save_account(&state.storage, &session_id, &account) {
                tracing::error!("Failed to persist new account: {}", e);
                return storage_unavailable();
            }
            tracing::info!("Created account for wallet {}", wallet_address);
            account
        }
        Err(e) => {
            tracing::error!("Storage error loading account: {}", e);
            return storage_unavailable();
        }
    };

    let response = ConnectWalletResponse {
        success: true,
        message: "Wallet connected".to_string(),
        session_id: Some(session_id.clone()),
        user: Some(AuthenticatedUser::from_account(&session_id, &account)),
    };
    (StatusCode::OK, Json(response))
}

fn storage_unavailable() -> (StatusCode, Json<ConnectWalletResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ConnectWalletResponse {
            success: false,
            message: "Storage unavailable".to_string(),
            session_id: None,
            user: None,
        }),
    )
}

// User profile response, including the pure time projections the UI
// renders on load
#[derive(Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: Option<AuthenticatedUser>,
    pub mining_remaining_ms: Option<u64>,
    pub cooldown_remaining_ms: Option<u64>,
    pub message: String,
}

// Get user profile endpoint (protected route)
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> (StatusCode, Json<ProfileResponse>) {
    let now_ms = state.clock.now_ms();

    let account = match load_account(&state.storage, &user.session_id) {
        Ok(Some(account)) => account,
        _ => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ProfileResponse {
                    success: false,
                    user: None,
                    mining_remaining_ms: None,
                    cooldown_remaining_ms: None,
                    message: "Unknown account".to_string(),
                }),
            );
        }
    };

    let response = ProfileResponse {
        success: true,
        mining_remaining_ms: account.remaining_mining_ms(now_ms),
        cooldown_remaining_ms: account.remaining_cooldown_ms(now_ms),
        user: Some(AuthenticatedUser::from_account(&user.session_id, &account)),
        message: "Profile retrieved successfully".to_string(),
    };
    (StatusCode::OK, Json(response))
}
