//! HTTP server assembly: shared state, router, fallbacks, and the serve loop.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, Uri, header},
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::auth::{self, IdentityProvider, TokenService};
use crate::config::{AppConfig, Environment};
use crate::store::AccountStore;

/// Immutable process-wide state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn AccountStore>,
    /// Present only in external auth mode.
    pub identity: Option<Arc<dyn IdentityProvider>>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn AccountStore>,
        identity: Option<Arc<dyn IdentityProvider>>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(&config.auth));
        Self {
            config: Arc::new(config),
            store,
            identity,
            tokens,
        }
    }
}

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .nest("/api/auth", auth::routes::router(&state))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.listen_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Clinic Auth API v1.0",
        "health": "/health",
        "endpoints": {
            "auth": "/api/auth",
            "version": env!("CARGO_PKG_VERSION"),
        },
    }))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let environment = match state.config.environment {
        Environment::Development => "development",
        Environment::Production => "production",
    };
    Json(serde_json::json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": environment,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Unknown routes get a machine-readable 404 listing what is available.
async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Route not found",
            "code": "ROUTE_NOT_FOUND",
            "path": uri.path(),
            "availableRoutes": [
                "GET /",
                "GET /health",
                "POST /api/auth/login",
                "POST /api/auth/refresh",
                "GET /api/auth/me",
                "POST /api/auth/logout",
            ],
        })),
    )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origin = config
        .frontend_origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| {
            warn!(
                "invalid frontend_origin {:?}, falling back to http://localhost:3000",
                config.frontend_origin
            );
            HeaderValue::from_static("http://localhost:3000")
        });

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
