//! /api/auth router assembly.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::{external, handlers, middleware as authn};
use crate::config::AuthMode;
use crate::server::AppState;

/// Build the authentication router. `/login` and `/refresh` are public;
/// `/me` and `/logout` sit behind the configured authentication variant.
pub fn router(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh));

    let protected = Router::new()
        .route("/me", get(handlers::me))
        .route("/logout", post(handlers::logout));

    let protected = match state.config.auth.mode {
        AuthMode::Local => protected.route_layer(middleware::from_fn_with_state(
            state.clone(),
            authn::require_auth,
        )),
        AuthMode::External => protected.route_layer(middleware::from_fn_with_state(
            state.clone(),
            external::require_external_auth,
        )),
    };

    public.merge(protected)
}
