use crate::AppState;
use axum::{Router, routing::get};

/// Public Router Module
///
/// Unauthenticated endpoints. Only the liveness check lives here; all content of the
/// platform is served to authenticated users.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Used by load balancers and container orchestration; answers "ok" immediately.
        .route("/health", get(|| async { "ok" }))
}
