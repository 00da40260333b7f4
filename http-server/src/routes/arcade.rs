use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use engine::account::{PlayerAccount, load_account, save_account};
use engine::arcade::{ArcadePhase, ArcadeRound};
use engine::clock::Clock;
use engine::constants::{COUNTDOWN_STEPS, SPECIAL_COIN_VALUE};
use engine::types::{Coin, CollectResult, SessionError};

use crate::websocket::{NotificationType, send_notification_to_user};
use crate::{AppState, middleware::AuthUser};

// Start round request
#[derive(Deserialize)]
pub struct StartRoundRequest {
    // Width of the play area in pixels, so spawns land inside it
    pub play_width: u32,
}

// Start round response
#[derive(Serialize)]
pub struct StartRoundResponse {
    pub success: bool,
    pub message: String,
    pub countdown: Option<u8>,
    pub cooldown_remaining_secs: Option<u64>,
}

// Round state response, returned by the driving tick
#[derive(Serialize)]
pub struct RoundStateResponse {
    pub success: bool,
    pub phase: String,
    pub countdown: Option<u8>,
    pub remaining_ms: u64,
    pub score: u64,
    pub balance: u64,
    pub coins: Vec<Coin>,
    pub message: String,
}

// Collect coin request
#[derive(Deserialize)]
pub struct CollectCoinRequest {
    pub coin_id: u64,
}

// Collect coin response
#[derive(Serialize)]
pub struct CollectCoinResponse {
    pub success: bool,
    pub credited: Option<u64>,
    pub score: u64,
    pub balance: u64,
    pub message: String,
}

// Abandon round response
#[derive(Serialize)]
pub struct AbandonRoundResponse {
    pub success: bool,
    pub message: String,
}

// Cooldown response
#[derive(Serialize)]
pub struct CooldownResponse {
    pub remaining_secs: u64,
}

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

fn describe_phase(phase: ArcadePhase) -> (String, Option<u8>) {
    match phase {
        ArcadePhase::Countdown { step, .. } => ("countdown".to_string(), Some(step)),
        ArcadePhase::Active { .. } => ("active".to_string(), None),
        ArcadePhase::Ended { .. } => ("ended".to_string(), None),
    }
}

// Start arcade round endpoint: rejected while the 5 minute cooldown from
// the previous round is still running. A prior live round for the same
// player is abandoned here; its spawn schedule dies with it
pub async fn start_round(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<StartRoundRequest>,
) -> (StatusCode, Json<StartRoundResponse>) {
    let now_ms = state.clock.now_ms();

    let mut account = match load_or_fail(&state, &user.session_id) {
        Ok(account) => account,
        Err((status, message)) => {
            return (
                status,
                Json(StartRoundResponse {
                    success: false,
                    message,
                    countdown: None,
                    cooldown_remaining_secs: None,
                }),
            );
        }
    };

    match ArcadeRound::start(&mut account, now_ms, payload.play_width) {
        Ok(round) => {
            // Starting clears an already-elapsed cooldown on the account
            if let Err(e) = save_account(&state.storage, &user.session_id, &account) {
                tracing::error!("Failed to persist round start: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(StartRoundResponse {
                        success: false,
                        message: "Storage unavailable".to_string(),
                        countdown: None,
                        cooldown_remaining_secs: None,
                    }),
                );
            }

            let mut rounds = state.rounds.lock().unwrap();
            rounds.insert(user.session_id.clone(), round);

            tracing::info!("Arcade round started for {}", user.wallet_address);
            (
                StatusCode::CREATED,
                Json(StartRoundResponse {
                    success: true,
                    message: "Round starting".to_string(),
                    countdown: Some(COUNTDOWN_STEPS),
                    cooldown_remaining_secs: None,
                }),
            )
        }
        Err(SessionError::OnCooldown { remaining_secs }) => (
            StatusCode::CONFLICT,
            Json(StartRoundResponse {
                success: false,
                message: format!("On cooldown for another {}s", remaining_secs),
                countdown: None,
                cooldown_remaining_secs: Some(remaining_secs),
            }),
        ),
        Err(e) => (
            StatusCode::CONFLICT,
            Json(StartRoundResponse {
                success: false,
                message: e.to_string(),
                countdown: None,
                cooldown_remaining_secs: None,
            }),
        ),
    }
}

// Round tick endpoint: drives the countdown, spawns due coins, sweeps
// stale ones, and closes the round when its window has passed. The UI
// polls this while the game screen is mounted
pub async fn tick_round(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> (StatusCode, Json<RoundStateResponse>) {
    let now_ms = state.clock.now_ms();

    let mut account = match load_or_fail(&state, &user.session_id) {
        Ok(account) => account,
        Err((status, message)) => {
            return (
                status,
                Json(RoundStateResponse {
                    success: false,
                    phase: "idle".to_string(),
                    countdown: None,
                    remaining_ms: 0,
                    score: 0,
                    balance: 0,
                    coins: Vec::new(),
                    message,
                }),
            );
        }
    };

    let mut rounds = state.rounds.lock().unwrap();
    let round = match rounds.get_mut(&user.session_id) {
        Some(round) => round,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(RoundStateResponse {
                    success: false,
                    phase: "idle".to_string(),
                    countdown: None,
                    remaining_ms: 0,
                    score: 0,
                    balance: account.balance,
                    coins: Vec::new(),
                    message: "No live round".to_string(),
                }),
            );
        }
    };

    let tick = round.tick(&mut account, now_ms);

    if let Some(end) = tick.ended {
        // The cooldown instant must be durable before anything else sees
        // the round as over
        if let Err(e) = save_account(&state.storage, &user.session_id, &account) {
            tracing::error!("Failed to persist round end: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RoundStateResponse {
                    success: false,
                    phase: "ended".to_string(),
                    countdown: None,
                    remaining_ms: 0,
                    score: round.score(),
                    balance: account.balance,
                    coins: Vec::new(),
                    message: "Storage unavailable".to_string(),
                }),
            );
        }

        send_notification_to_user(
            &state.notifications,
            &user.session_id,
            NotificationType::RoundEnded {
                score: end.score,
                cooldown_end_ms: end.cooldown_end_ms,
            },
        );
        tracing::info!(
            "Arcade round ended for {} with score {}",
            user.wallet_address,
            end.score
        );
    }

    let (phase, countdown) = describe_phase(round.phase());
    let response = RoundStateResponse {
        success: true,
        phase,
        countdown,
        remaining_ms: round.remaining_ms(now_ms),
        score: round.score(),
        balance: account.balance,
        coins: round.coins().to_vec(),
        message: "Round state".to_string(),
    };
    (StatusCode::OK, Json(response))
}

// Collect coin endpoint. First click wins; the credit lands on the balance
// ledger immediately, not at round end
pub async fn collect_coin(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CollectCoinRequest>,
) -> (StatusCode, Json<CollectCoinResponse>) {
    let now_ms = state.clock.now_ms();

    let mut account = match load_or_fail(&state, &user.session_id) {
        Ok(account) => account,
        Err((status, message)) => {
            return (
                status,
                Json(CollectCoinResponse {
                    success: false,
                    credited: None,
                    score: 0,
                    balance: 0,
                    message,
                }),
            );
        }
    };

    let mut rounds = state.rounds.lock().unwrap();
    let round = match rounds.get_mut(&user.session_id) {
        Some(round) => round,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(CollectCoinResponse {
                    success: false,
                    credited: None,
                    score: 0,
                    balance: account.balance,
                    message: "No live round".to_string(),
                }),
            );
        }
    };

    match round.collect(&mut account, payload.coin_id, now_ms) {
        CollectResult::Credited { amount } => {
            // One write commits the credit
            if let Err(e) = save_account(&state.storage, &user.session_id, &account) {
                tracing::error!("Failed to persist coin credit: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(CollectCoinResponse {
                        success: false,
                        credited: None,
                        score: round.score(),
                        balance: user.balance,
                        message: "Storage unavailable".to_string(),
                    }),
                );
            }

            if amount == SPECIAL_COIN_VALUE {
                send_notification_to_user(
                    &state.notifications,
                    &user.session_id,
                    NotificationType::SpecialCoin {
                        value: amount,
                        balance: account.balance,
                    },
                );
            }

            (
                StatusCode::OK,
                Json(CollectCoinResponse {
                    success: true,
                    credited: Some(amount),
                    score: round.score(),
                    balance: account.balance,
                    message: "Coin collected".to_string(),
                }),
            )
        }
        CollectResult::AlreadyCollected => (
            StatusCode::OK,
            Json(CollectCoinResponse {
                success: false,
                credited: None,
                score: round.score(),
                balance: account.balance,
                message: "Coin already collected".to_string(),
            }),
        ),
        CollectResult::RoundOver => (
            StatusCode::CONFLICT,
            Json(CollectCoinResponse {
                success: false,
                credited: None,
                score: round.score(),
                balance: account.balance,
                message: "Round is over".to_string(),
            }),
        ),
    }
}

// Abandon round endpoint: the UI navigated away or tore the game screen
// down. Dropping the round cancels its schedule; abandonment sets no
// cooldown, only a round reaching its end instant does
pub async fn abandon_round(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> (StatusCode, Json<AbandonRoundResponse>) {
    let mut rounds = state.rounds.lock().unwrap();
    let removed = rounds.remove(&user.session_id).is_some();

    if removed {
        tracing::info!("Arcade round abandoned by {}", user.wallet_address);
        (
            StatusCode::OK,
            Json(AbandonRoundResponse {
                success: true,
                message: "Round abandoned".to_string(),
            }),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(AbandonRoundResponse {
                success: false,
                message: "No live round".to_string(),
            }),
        )
    }
}

// Cooldown endpoint: recomputed from the persisted instant on every call,
// never from an in-memory countdown, so a reload mid-cooldown stays
// correct
pub async fn get_cooldown(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> (StatusCode, Json<CooldownResponse>) {
    let now_ms = state.clock.now_ms();

    let account = match load_or_fail(&state, &user.session_id) {
        Ok(account) => account,
        Err((status, _)) => {
            return (status, Json(CooldownResponse { remaining_secs: 0 }));
        }
    };

    let remaining_secs = account
        .remaining_cooldown_ms(now_ms)
        .map(|ms| ms.div_ceil(1_000))
        .unwrap_or(0);

    (StatusCode::OK, Json(CooldownResponse { remaining_secs }))
}
