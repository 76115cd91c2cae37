//! HTTP middleware for basic-auth-gateway
//!
//! This module provides middleware layers for:
//! - Per-path Basic authentication (the gateway itself)
//! - Request/response logging

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;

use crate::auth::{credentials_from_headers, decode_request_path, Decision, RejectReason};
use crate::error::AuthError;

use super::router::AppState;

/// Authenticated user extension for requests
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

/// Gateway middleware function
///
/// This middleware:
/// 1. Percent-decodes the request path (400 if it is ambiguous)
/// 2. Applies welcome-file substitution to get the effective path
/// 3. Extracts Basic credentials (malformed headers count as absent)
/// 4. Asks the decision engine what to do
/// 5. On Allow, forwards the request and forces the configured Cache-Control
pub async fn gateway_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let request_path = match decode_request_path(request.uri().path()) {
        Ok(path) => path,
        Err(e) => {
            tracing::info!(path = %request.uri().path(), error = %e, "Refusing request path");
            return bad_request_response();
        }
    };
    let effective = state.resolver.effective_path(&request_path).await;

    let credentials = match credentials_from_headers(request.headers()) {
        Ok(credentials) => Some(credentials),
        Err(AuthError::MissingAuth) => None,
        Err(e) => {
            tracing::debug!(path = %request_path, error = %e, "Ignoring unusable authorization header");
            None
        }
    };

    let decision = state.engine.decide(&effective.path, credentials.as_ref());
    tracing::debug!(
        path = %request_path,
        effective_path = %effective.path,
        decision = ?decision,
        "Authorization decided"
    );

    match decision {
        Decision::Allow { user } => {
            request
                .extensions_mut()
                .insert(AuthenticatedUser(user.clone()));
            request.extensions_mut().insert(effective);

            let mut response = next.run(request).await;
            response.extensions_mut().insert(AuthenticatedUser(user));
            if let Some(cache_control) = &state.cache_control {
                response
                    .headers_mut()
                    .insert(header::CACHE_CONTROL, cache_control.clone());
            }
            response
        }
        Decision::Challenge => AuthResponse::challenge(&state.engine.challenge_header()).into_response(),
        Decision::Reject(reason) => {
            tracing::info!(
                path = %request_path,
                user = credentials.as_ref().map(|c| c.username.as_str()).unwrap_or("-"),
                reason = ?reason,
                "Request rejected"
            );
            AuthResponse::reject(reason).into_response()
        }
    }
}

fn bad_request_response() -> Response {
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "application/json")],
        serde_json::json!({ "error": "Invalid request path" }).to_string(),
    )
        .into_response()
}

/// Authentication error response
pub struct AuthResponse {
    status: StatusCode,
    message: String,
    challenge: Option<HeaderValue>,
}

impl AuthResponse {
    /// 401 with a fresh `WWW-Authenticate` challenge
    pub fn challenge(www_authenticate: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Authentication required".to_string(),
            challenge: HeaderValue::from_str(www_authenticate).ok(),
        }
    }

    /// 401 or 403 without a challenge
    pub fn reject(reason: RejectReason) -> Self {
        match reason {
            RejectReason::Unauthenticated => Self {
                status: StatusCode::UNAUTHORIZED,
                message: "Authentication required".to_string(),
                challenge: None,
            },
            RejectReason::Forbidden => Self {
                status: StatusCode::FORBIDDEN,
                message: "Access denied".to_string(),
                challenge: None,
            },
        }
    }
}

impl IntoResponse for AuthResponse {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message
        });
        let mut response = (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response();

        if let Some(challenge) = self.challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, challenge);
        }
        response
    }
}

/// Logging middleware function
///
/// Logs request and response details including:
/// - Method and path
/// - Authenticated user, when the gateway allowed the request
/// - Status code
/// - Response time
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status();
    let user = response
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|user| user.0.as_str())
        .unwrap_or("-");

    tracing::info!(
        method = %method,
        path = %uri.path(),
        user = %user,
        status = %status.as_u16(),
        duration_ms = %elapsed.as_millis(),
        "Request completed"
    );

    response
}
