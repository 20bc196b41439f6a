//! User handlers

use crate::core::auth::{hash_password, password_is_acceptable};
use crate::core::config::AppState;
use crate::core::error::{Error, Result};
use crate::core::models::{validate, NewUser, User, UserInfo};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserInfo>>> {
    info!("GET /api/users");
    let users = state.store.list_users_with_blogs().await?;
    Ok(Json(users))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>)> {
    let Json(req) = payload?;
    info!("POST /api/users - {}", req.username);

    if !password_is_acceptable(&req.password) {
        return Err(Error::InvalidPassword);
    }

    if state
        .store
        .find_user_by_username(&req.username)
        .await?
        .is_some()
    {
        return Err(Error::UsernameTaken);
    }

    validate("User", &req)?;

    let user = User {
        password_hash: hash_password(&req.password)?,
        username: req.username,
        name: req.name,
        blogs: Vec::new(),
        id: Uuid::new_v4(),
    };
    state.store.insert_user(&user).await?;

    info!("User {} registered successfully", user.username);

    Ok((StatusCode::CREATED, Json(user)))
}
