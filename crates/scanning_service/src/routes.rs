//! HTTP surface: health check, login and set ingestion.

use crate::auth::{require_session, Authenticator, BearerToken, LoginResponse};
use crate::errors::{error_response, render};
use crate::ingest::{IngestError, Ingestor};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, Extension, State};
use axum::http::header::{CONTENT_TYPE, SET_COOKIE};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post};
use axum::{middleware, Json, Router};
use scanning_protocol::defaults::MAX_SET_BODY_BYTES;
use scanning_protocol::ApiResponse;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

const XML_CONTENT_TYPES: [&str; 2] = ["application/xml", "text/xml"];

#[derive(Clone)]
pub struct AppState {
    pub ingestor: Arc<Ingestor>,
    pub auth: Arc<Authenticator>,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/ddc", any(ingest))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/health-check", get(health_check))
        .route("/auth/sessions", post(login))
        .merge(api)
        .layer(DefaultBodyLimit::max(MAX_SET_BODY_BYTES))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn login(State(state): State<AppState>, body: Bytes) -> Response {
    match state.auth.login(&body).await {
        Ok(session) => {
            let cookie = state.auth.session_cookie(&session);
            info!(email = %session.email, "Session created");
            let body = LoginResponse {
                email: session.email,
                authentication_token: session.token,
            };
            ([(SET_COOKIE, cookie)], Json(body)).into_response()
        }
        Err(e) => {
            info!(error = %e, "Login refused");
            let body = serde_json::json!({ "error": format!("Authentication failed: {}", e) });
            (StatusCode::UNAUTHORIZED, Json(body)).into_response()
        }
    }
}

/// Method, content type and body, checked before anything is stored.
fn check_request(
    method: &Method,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Bytes, IngestError> {
    if method != Method::POST {
        return Err(IngestError::MethodNotAllowed(method.to_string()));
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !XML_CONTENT_TYPES
        .iter()
        .any(|accepted| content_type.starts_with(accepted))
    {
        return Err(IngestError::InvalidContentType(content_type.to_string()));
    }

    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            IngestError::BodyTooLarge
        } else {
            IngestError::InvalidBody(rejection.body_text())
        }
    })?;
    if body.is_empty() {
        return Err(IngestError::InvalidBody("request body is empty".to_string()));
    }
    Ok(body)
}

async fn ingest(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    token: Option<Extension<BearerToken>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let span = info_span!("ingest", request_id = %Uuid::now_v7());
    async move {
        let token = token
            .map(|Extension(BearerToken(token))| token)
            .unwrap_or_default();
        let result = match check_request(&method, &headers, body) {
            Ok(body) => {
                info!(bytes = body.len(), "Received set");
                state.ingestor.ingest(&token, &body).await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(uid) => {
                info!(uid, "Set queued for processing");
                render(StatusCode::ACCEPTED, &ApiResponse::queued(&uid))
            }
            Err(err) => error_response(&err),
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn xml_headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn test_check_request_order() {
        let body = || Ok(Bytes::from_static(b"<Set/>"));
        assert!(matches!(
            check_request(&Method::GET, &xml_headers("text/plain"), body()),
            Err(IngestError::MethodNotAllowed(_))
        ));
        assert!(matches!(
            check_request(&Method::POST, &xml_headers("text/plain"), body()),
            Err(IngestError::InvalidContentType(_))
        ));
        assert!(matches!(
            check_request(&Method::POST, &HeaderMap::new(), body()),
            Err(IngestError::InvalidContentType(_))
        ));
        assert!(check_request(&Method::POST, &xml_headers("text/xml"), body()).is_ok());
        assert!(check_request(
            &Method::POST,
            &xml_headers("application/xml; charset=utf-8"),
            body()
        )
        .is_ok());
    }

    #[test]
    fn test_empty_body_is_refused() {
        assert!(matches!(
            check_request(
                &Method::POST,
                &xml_headers("application/xml"),
                Ok(Bytes::new())
            ),
            Err(IngestError::InvalidBody(_))
        ));
    }
}
