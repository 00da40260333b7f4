use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use engine::account::load_account;

use crate::{AppState, models::AuthenticatedUser};

// Axum extractor for authenticated users
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Extract the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .ok_or_else(|| {
                (StatusCode::UNAUTHORIZED, "Missing Authorization header").into_response()
            })?;

        // Check if it's a Bearer token
        if !auth_header.starts_with("Bearer ") {
            return Err((
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header format",
            )
                .into_response());
        }

        // Extract the token (the wallet session id)
        let token = &auth_header[7..]; // Remove "Bearer " prefix

        // Look the account up through the engine store; a corrupt record
        // loads as absent and fails auth the same way an unknown one does
        match load_account(&state.storage, token) {
            Ok(Some(account)) => Ok(AuthUser(AuthenticatedUser::from_account(token, &account))),
            Ok(None) => Err((StatusCode::UNAUTHORIZED, "Invalid token").into_response()),
            Err(e) => {
                tracing::error!("Storage unavailable during auth: {}", e);
                Err((StatusCode::INTERNAL_SERVER_ERROR, "Storage unavailable").into_response())
            }
        }
    }
}
