//! HTTP router for basic-auth-gateway
//!
//! This module defines the axum router that handles all HTTP requests.
//! It provides routes for:
//! - The `/api` endpoint
//! - Static resources under the document root (fallback)
//!
//! Every route, the fallback included, sits behind the gateway middleware.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use std::sync::Arc;

use crate::auth::{decode_request_path, normalize_request_path, AuthEngine};
use crate::config::{Config, ConfigError};
use crate::error::{AppError, ResolveError};
use crate::resource::{EffectivePath, FilesystemResolver, FilesystemResolverConfig, ResourceResolver};

use super::middleware::{gateway_middleware, logging_middleware};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Authorization decision engine
    pub engine: Arc<AuthEngine>,

    /// Downstream resource resolver
    pub resolver: Arc<dyn ResourceResolver>,

    /// Cache-Control value forced onto allowed responses
    pub cache_control: Option<HeaderValue>,
}

impl AppState {
    /// Create application state
    ///
    /// An empty `cache_control` leaves handler headers untouched.
    pub fn new(
        engine: Arc<AuthEngine>,
        resolver: Arc<dyn ResourceResolver>,
        cache_control: &str,
    ) -> Result<Self, ConfigError> {
        let cache_control = match cache_control.trim() {
            "" => None,
            value => Some(HeaderValue::from_str(value).map_err(|_| {
                ConfigError::InvalidValue(format!("invalid cache_control: {:?}", value))
            })?),
        };

        Ok(Self {
            engine,
            resolver,
            cache_control,
        })
    }

    /// Validate configuration, then build the engine and the filesystem resolver
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        config.validate()?;

        let engine = AuthEngine::from_config(&config.auth)?;
        let resolver = FilesystemResolver::new(FilesystemResolverConfig::from(&config.resources));

        if !resolver.document_root().is_dir() {
            tracing::warn!(
                document_root = %resolver.document_root().display(),
                "Document root does not exist; static requests will return 404"
            );
        }

        Ok(Self::new(
            Arc::new(engine),
            Arc::new(resolver),
            &config.resources.cache_control,
        )?)
    }
}

/// Build the main application router
///
/// # Arguments
///
/// * `state` - Application state containing the engine and resolver
///
/// # Returns
///
/// An axum Router with the gateway applied to every endpoint
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(api_handler))
        .fallback(static_handler)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gateway_middleware,
        ))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

/// `/api` handler
async fn api_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=UTF-8")],
        "OK\n",
    )
}

/// Static resource handler
///
/// Serves the effective path computed by the gateway. Directories requested
/// without a trailing slash are redirected first so relative links resolve.
async fn static_handler(
    State(state): State<AppState>,
    effective: Option<Extension<EffectivePath>>,
    request: Request,
) -> Response {
    let method = request.method();
    if method != Method::GET && method != Method::HEAD {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "GET, HEAD")],
        )
            .into_response();
    }

    let request_path = normalize_request_path(request.uri().path());
    let effective = match effective {
        Some(Extension(effective)) => effective,
        None => match decode_request_path(request_path) {
            Ok(decoded) => state.resolver.effective_path(&decoded).await,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({ "error": "Invalid request path" })),
                )
                    .into_response()
            }
        },
    };

    if effective.directory && !request_path.ends_with('/') {
        let location = match request.uri().query() {
            Some(query) => format!("{}/?{}", request_path, query),
            None => format!("{}/", request_path),
        };
        return (StatusCode::FOUND, [(header::LOCATION, location)]).into_response();
    }

    match state.resolver.resolve(&effective.path).await {
        Ok(resource) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, resource.content_type)],
            resource.content,
        )
            .into_response(),
        Err(e) => resolve_error_response(&effective.path, e),
    }
}

fn resolve_error_response(path: &str, error: ResolveError) -> Response {
    let (status, message) = match &error {
        ResolveError::NotFound => (StatusCode::NOT_FOUND, "Not found"),
        ResolveError::DirectoryListing => (StatusCode::FORBIDDEN, "Directory listing is disabled"),
        ResolveError::Io(e) => {
            tracing::error!(path = %path, error = %e, "Failed to read resource");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read resource")
        }
    };

    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
