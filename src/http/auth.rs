//! Auth guard middleware.
//!
//! Checks run in order, each short-circuiting:
//! 1. `auth` config document present, else 500 `no-config`
//! 2. some `X-Forwarded-For` entry is whitelisted, else 403
//! 3. `Authorization` header is a known code, else 401

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::http::response::json_error;
use crate::http::server::AppState;
use crate::relay::{RelayError, Rejection};
use crate::store::{find_record, AuthConfig};

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

pub async fn auth_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let auth = match find_record::<AuthConfig>(
        state.store.as_ref(),
        &state.guard.configs_collection,
        &state.guard.auth_key,
    )
    .await
    {
        Ok(Some(auth)) => auth,
        Ok(None) => {
            tracing::error!(key = %state.guard.auth_key, "Auth config missing");
            return RelayError::from(Rejection::NoConfig).into_response();
        }
        Err(e) => return RelayError::from(e).into_response(),
    };

    let forwarded = request
        .headers()
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !auth.allows_any_ip(forwarded.split(',').map(str::trim)) {
        tracing::warn!(forwarded_for = %forwarded, "IP not allowed");
        return json_error(StatusCode::FORBIDDEN, "ip-not-allowed", "IP not allowed");
    }

    let code = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    match code {
        Some(code) if auth.accepts_code(code) => next.run(request).await,
        _ => json_error(StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized"),
    }
}
