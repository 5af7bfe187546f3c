//! Browser endpoints: form-encoded in, HTML out.

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::Html;
use credgate_core::CredentialInput;
use tracing::debug;

use crate::error::ApiError;
use crate::html::{Tone, page};
use crate::state::AppState;

type PageResponse = (StatusCode, Html<String>);

pub(super) async fn index() -> Html<String> {
    page(None, None)
}

pub(super) async fn register(
    State(state): State<AppState>,
    payload: Result<Form<CredentialInput>, FormRejection>,
) -> PageResponse {
    let input = match body(payload) {
        Ok(input) => input,
        Err(err) => return failure(&err),
    };

    match state.gateway.register(&input).await {
        Ok(registered) => (
            StatusCode::OK,
            page(Some((Tone::Success, registered.message().as_str())), None),
        ),
        Err(err) => failure(&ApiError::from(err)),
    }
}

pub(super) async fn login(
    State(state): State<AppState>,
    payload: Result<Form<CredentialInput>, FormRejection>,
) -> PageResponse {
    let input = match body(payload) {
        Ok(input) => input,
        Err(err) => return failure(&err),
    };

    match state.gateway.validate(&input).await {
        Ok(validated) => {
            let message = format!("Login successful! Welcome back, {}!", validated.user.username);
            (
                StatusCode::OK,
                page(Some((Tone::Success, message.as_str())), Some(&validated.user)),
            )
        }
        Err(err) => failure(&ApiError::from(err)),
    }
}

fn body(payload: Result<Form<CredentialInput>, FormRejection>) -> Result<CredentialInput, ApiError> {
    payload.map(|Form(input)| input).map_err(|rejection| {
        debug!("Rejected form body: {rejection}");
        ApiError::new(StatusCode::BAD_REQUEST, "No form data provided")
    })
}

fn failure(err: &ApiError) -> PageResponse {
    (err.status, page(Some((Tone::Error, err.message.as_str())), None))
}
