//! Login handler

use crate::core::auth::verify_password;
use crate::core::config::AppState;
use crate::core::error::{Error, Result};
use crate::core::models::{LoginRequest, LoginResponse};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::{info, warn};

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(req) = payload?;
    info!("POST /api/login - {}", req.username);

    let user = state.store.find_user_by_username(&req.username).await?;

    let user = match user {
        Some(user) if verify_password(&req.password, &user.password_hash) => user,
        _ => {
            warn!("Failed login attempt for {}", req.username);
            return Err(Error::LoginFail);
        }
    };

    let token = state.tokens.issue(user.id, &user.username)?;
    info!("User {} logged in successfully", user.username);

    Ok(Json(LoginResponse {
        token,
        username: user.username,
        name: user.name,
    }))
}
