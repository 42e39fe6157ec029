//! Session introspection endpoints

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};

use crate::auth::{authenticate, AuthStatus};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(status))
        .route("/check", get(check))
}

async fn status(State(state): State<AppState>, headers: HeaderMap) -> Json<AuthStatus> {
    Json(authenticate(&headers, &state.config().auth))
}

async fn check(State(state): State<AppState>, headers: HeaderMap) -> (StatusCode, Json<AuthStatus>) {
    let status = authenticate(&headers, &state.config().auth);
    let code = if status.authenticated {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };
    (code, Json(status))
}
