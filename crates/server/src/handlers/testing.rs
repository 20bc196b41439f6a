//! Test-mode only endpoints

use crate::core::config::AppState;
use crate::core::error::Result;
use axum::{extract::State, http::StatusCode};
use tracing::info;

/// POST /api/testing/reset
pub async fn reset(State(state): State<AppState>) -> Result<StatusCode> {
    info!("POST /api/testing/reset");
    state.store.reset().await?;
    Ok(StatusCode::NO_CONTENT)
}
