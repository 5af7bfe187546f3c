//! JSON endpoints.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use credgate_core::CredentialInput;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

fn body(payload: Result<Json<CredentialInput>, JsonRejection>) -> Result<CredentialInput, ApiError> {
    payload.map(|Json(input)| input).map_err(|rejection| {
        debug!("Rejected JSON body: {rejection}");
        ApiError::no_body()
    })
}

pub(super) async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let input = body(payload)?;
    let registered = state.gateway.register(&input).await?;

    Ok(Json(json!({
        "success": true,
        "message": registered.message(),
        "user_id": registered.id,
    })))
}

pub(super) async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let input = body(payload)?;
    let validated = state.gateway.validate(&input).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Login successful! Welcome back, {}!", validated.user.username),
        "user_data": validated.user,
        "matched_by": validated.matched_by,
    })))
}
