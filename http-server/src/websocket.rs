use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

use crate::AppState;

// Notification types that can be sent to users; the UI renders these as
// toasts and HUD updates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NotificationType {
    #[serde(rename = "mining_reward")]
    MiningReward { units: u64, balance: u64 },
    #[serde(rename = "mining_expired")]
    MiningExpired { balance: u64 },
    #[serde(rename = "special_coin")]
    SpecialCoin { value: u64, balance: u64 },
    #[serde(rename = "round_ended")]
    RoundEnded { score: u64, cooldown_end_ms: u64 },
    #[serde(rename = "connection_established")]
    ConnectionEstablished { session_id: String, message: String },
}

// Global notification manager, keyed by session id
pub type NotificationManager = Arc<Mutex<HashMap<String, broadcast::Sender<NotificationType>>>>;

// Create a new notification manager
pub fn create_notification_manager() -> NotificationManager {
    Arc::new(Mutex::new(HashMap::new()))
}

// WebSocket handler
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket_with_auth(socket, state))
}

// Authentication message structure
#[derive(Debug, Deserialize)]
struct AuthMessage {
    #[serde(rename = "sessionId")]
    session_id: String,
}

// Handle socket with authentication via first message
async fn handle_socket_with_auth(socket: WebSocket, state: AppState) {
    tracing::info!("WebSocket connection established, awaiting authentication");

    // Split the socket into sender and receiver
    let (mut sender, mut receiver) = socket.split();

    // Wait for authentication message
    let session_id = match receiver.next().await {
        Some(Ok(Message::Text(text))) => {
            match serde_json::from_str::<AuthMessage>(&text) {
                Ok(auth_msg) => {
                    // Validate the session id against stored accounts
                    match engine::account::load_account(&state.storage, &auth_msg.session_id) {
                        Ok(Some(account)) => {
                            tracing::info!(
                                "Wallet {} authenticated via WebSocket",
                                account.wallet_address
                            );
                            auth_msg.session_id
                        }
                        _ => {
                            tracing::warn!(
                                "Invalid session id in WebSocket auth: {}",
                                auth_msg.session_id
                            );
                            let _ = sender
                                .send(Message::Text(
                                    serde_json::to_string(
                                        &NotificationType::ConnectionEstablished {
                                            session_id: String::new(),
                                            message: "Authentication failed: invalid session id"
                                                .to_string(),
                                        },
                                    )
                                    .unwrap_or_default()
                                    .into(),
                                ))
                                .await;
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to parse WebSocket auth message: {}", e);
                    let _ = sender
                        .send(Message::Text(
                            "Authentication failed: invalid message format"
                                .to_string()
                                .into(),
                        ))
                        .await;
                    return;
                }
            }
        }
        Some(Ok(Message::Close(_))) => {
            tracing::info!("WebSocket connection closed before authentication");
            return;
        }
        Some(Err(e)) => {
            tracing::error!("WebSocket error during authentication: {}", e);
            return;
        }
        None => {
            tracing::warn!("WebSocket connection closed before authentication");
            return;
        }
        _ => {
            tracing::warn!("Unexpected message type during WebSocket authentication");
            return;
        }
    };

    // Continue with authenticated socket handling
    handle_authenticated_socket(sender, receiver, session_id, state).await;
}

async fn handle_authenticated_socket(
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
    mut receiver: futures_util::stream::SplitStream<WebSocket>,
    session_id: String,
    state: AppState,
) {
    tracing::info!("WebSocket connection established for session {}", session_id);

    // Create a broadcast channel for this user
    let (tx, mut rx) = broadcast::channel(100);

    // Store the sender in the notification manager
    {
        let mut notification_manager = state.notifications.lock().unwrap();
        notification_manager.insert(session_id.clone(), tx.clone());
    }

    // Send connection established message
    let connection_msg = NotificationType::ConnectionEstablished {
        session_id: session_id.clone(),
        message: "Successfully connected to notifications".to_string(),
    };

    if let Ok(msg_text) = serde_json::to_string(&connection_msg) {
        if sender.send(Message::Text(msg_text.into())).await.is_err() {
            tracing::warn!("Failed to send connection message to {}", session_id);
        }
    }

    // Spawn a task to handle incoming messages from the client
    let incoming_session = session_id.clone();
    let incoming_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    tracing::debug!("Received message from {}: {}", incoming_session, text);
                    // Nothing to handle yet; the stream is server-to-client
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("WebSocket connection closed by {}", incoming_session);
                    break;
                }
                Err(e) => {
                    tracing::error!("WebSocket error for {}: {}", incoming_session, e);
                    break;
                }
                _ => {
                    // Ignore other message types
                }
            }
        }
    });

    // Handle outgoing notifications
    let outgoing_session = session_id.clone();
    let outgoing_task = tokio::spawn(async move {
        while let Ok(notification) = rx.recv().await {
            match serde_json::to_string(&notification) {
                Ok(msg_text) => {
                    if sender.send(Message::Text(msg_text.into())).await.is_err() {
                        tracing::warn!("Failed to send notification to {}", outgoing_session);
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to serialize notification for {}: {}",
                        outgoing_session,
                        e
                    );
                }
            }
        }
    });

    // Wait for either task to complete (connection closed/error, or send
    // failure)
    tokio::select! {
        _ = incoming_task => {
            tracing::info!("Incoming task completed for {}", session_id);
        }
        _ = outgoing_task => {
            tracing::info!("Outgoing task completed for {}", session_id);
        }
    }

    // Clean up: remove the user from the notification manager
    {
        let mut notification_manager = state.notifications.lock().unwrap();
        notification_manager.remove(&session_id);
    }

    tracing::info!("WebSocket connection closed for {}", session_id);
}

pub fn send_notification_to_user(
    notification_manager: &NotificationManager,
    session_id: &str,
    notification: NotificationType,
) {
    let manager = notification_manager.lock().unwrap();
    if let Some(tx) = manager.get(session_id) {
        if let Err(e) = tx.send(notification) {
            tracing::warn!("Failed to send notification to {}: {}", session_id, e);
        }
    }
}
