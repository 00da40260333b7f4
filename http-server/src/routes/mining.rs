use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use engine::account::{PlayerAccount, load_account, save_account};
use engine::clock::Clock;
use engine::types::SessionError;

use crate::websocket::{NotificationType, send_notification_to_user};
use crate::{AppState, middleware::AuthUser};

// Start mining response
#[derive(Serialize)]
pub struct StartMiningResponse {
    pub success: bool,
    pub message: String,
    pub end_time_ms: Option<u64>,
}

// Mining tick response
#[derive(Serialize)]
pub struct MiningTickResponse {
    pub success: bool,
    pub units_credited: u64,
    pub balance: u64,
    pub expired: bool,
    pub remaining_ms: Option<u64>,
    pub message: String,
}

// Mining status response
#[derive(Serialize)]
pub struct MiningStatusResponse {
    pub active: bool,
    pub remaining_ms: Option<u64>,
}

// Loads the caller's account or maps the failure to a response
fn load_or_fail(
    state: &AppState,
    session_id: &str,
) -> Result<PlayerAccount, (StatusCode, String)> {
    match load_account(&state.storage, session_id) {
        Ok(Some(account)) => Ok(account),
        Ok(None) => Err((StatusCode::UNAUTHORIZED, "Unknown account".to_string())),
        Err(e) => {
            tracing::error!("Storage error loading account: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Storage unavailable".to_string(),
            ))
        }
    }
}

// Start mining endpoint: one session start per calendar day
pub async fn start_mining(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> (StatusCode, Json<StartMiningResponse>) {
    let now_ms = state.clock.now_ms();

    let mut account = match load_or_fail(&state, &user.session_id) {
        Ok(account) => account,
        Err((status, message)) => {
            return (
                status,
                Json(StartMiningResponse {
                    success: false,
                    message,
                    end_time_ms: None,
                }),
            );
        }
    };

    match account.start_mining(now_ms) {
        Ok(record) => {
            if let Err(e) = save_account(&state.storage, &user.session_id, &account) {
                tracing::error!("Failed to persist mining start: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(StartMiningResponse {
                        success: false,
                        message: "Storage unavailable".to_string(),
                        end_time_ms: None,
                    }),
                );
            }

            tracing::info!("Mining session started for {}", user.wallet_address);
            (
                StatusCode::CREATED,
                Json(StartMiningResponse {
                    success: true,
                    message: "Mining session started".to_string(),
                    end_time_ms: Some(record.end_time_ms),
                }),
            )
        }
        Err(SessionError::AlreadyStartedToday) => (
            StatusCode::CONFLICT,
            Json(StartMiningResponse {
                success: false,
                message: "Mining already started today".to_string(),
                end_time_ms: None,
            }),
        ),
        Err(e) => (
            StatusCode::CONFLICT,
            Json(StartMiningResponse {
                success: false,
                message: e.to_string(),
                end_time_ms: None,
            }),
        ),
    }
}

// Mining accrual tick endpoint. The UI calls this on page load and on its
// 30-60s foreground interval; redundant calls observe nothing elapsed and
// credit nothing, and a tick with no active session is a no-op
pub async fn tick_mining(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> (StatusCode, Json<MiningTickResponse>) {
    let now_ms = state.clock.now_ms();

    let mut account = match load_or_fail(&state, &user.session_id) {
        Ok(account) => account,
        Err((status, message)) => {
            return (
                status,
                Json(MiningTickResponse {
                    success: false,
                    units_credited: 0,
                    balance: 0,
                    expired: false,
                    remaining_ms: None,
                    message,
                }),
            );
        }
    };

    let tick = account.tick_mining(now_ms);

    // The credit and the advanced accrual timestamp persist as one write
    if tick.credited > 0 || tick.expired {
        if let Err(e) = save_account(&state.storage, &user.session_id, &account) {
            tracing::error!("Failed to persist mining tick: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MiningTickResponse {
                    success: false,
                    units_credited: 0,
                    balance: user.balance,
                    expired: false,
                    remaining_ms: None,
                    message: "Storage unavailable".to_string(),
                }),
            );
        }
    }

    if tick.credited > 0 {
        send_notification_to_user(
            &state.notifications,
            &user.session_id,
            NotificationType::MiningReward {
                units: tick.credited,
                balance: account.balance,
            },
        );
    }
    if tick.expired {
        send_notification_to_user(
            &state.notifications,
            &user.session_id,
            NotificationType::MiningExpired {
                balance: account.balance,
            },
        );
        tracing::info!("Mining session expired for {}", user.wallet_address);
    }

    let response = MiningTickResponse {
        success: true,
        units_credited: tick.credited,
        balance: account.balance,
        expired: tick.expired,
        remaining_ms: account.remaining_mining_ms(now_ms),
        message: if tick.credited > 0 {
            format!("Credited {} GCT", tick.credited)
        } else {
            "Nothing to accrue".to_string()
        },
    };
    (StatusCode::OK, Json(response))
}

// Mining status endpoint: a pure read projection over the persisted record
pub async fn mining_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> (StatusCode, Json<MiningStatusResponse>) {
    let now_ms = state.clock.now_ms();

    let account = match load_or_fail(&state, &user.session_id) {
        Ok(account) => account,
        Err((status, _)) => {
            return (
                status,
                Json(MiningStatusResponse {
                    active: false,
                    remaining_ms: None,
                }),
            );
        }
    };

    let remaining_ms = account.remaining_mining_ms(now_ms);
    (
        StatusCode::OK,
        Json(MiningStatusResponse {
            active: remaining_ms.is_some(),
            remaining_ms,
        }),
    )
}
