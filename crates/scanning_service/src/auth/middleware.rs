use crate::routes::AppState;
use axum::extract::{Request, State};
use axum::http::header::COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use scanning_protocol::defaults::SESSION_COOKIE_NAME;
use tracing::info;

/// Session token of the caller, forwarded to Sirius as the bearer token.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Value of the session cookie, if the request carries one.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE_NAME)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

fn unauthorized(message: &'static str) -> Response {
    (StatusCode::UNAUTHORIZED, message).into_response()
}

pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = session_token(request.headers()) else {
        return unauthorized("Unauthorized: Missing token");
    };
    if let Err(e) = state.auth.verify(&token).await {
        info!(error = %e, "Rejected session token");
        return unauthorized("Unauthorized: Invalid token");
    }
    request.extensions_mut().insert(BearerToken(token));
    next.run(request).await
}
