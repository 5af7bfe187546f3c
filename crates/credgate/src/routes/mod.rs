//! HTTP routes.

mod api;
mod form;
mod ops;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

/// Build the application router.
///
/// `/debug` is only mounted when debug endpoints are enabled in the
/// configuration.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(form::index))
        .route("/register", post(form::register))
        .route("/login", post(form::login))
        .route("/api/register", post(api::register))
        .route("/api/login", post(api::login))
        .route("/health", get(ops::health));

    if state.config.debug_endpoints {
        router = router.route("/debug", get(ops::debug));
    }

    router.fallback(ops::not_found).with_state(state)
}
