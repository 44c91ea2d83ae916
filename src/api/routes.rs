use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/options", get(handlers::get_options))
        .route("/recommend", get(handlers::recommend))
        .route("/images/:image_ref", get(handlers::get_image))
        // Wizard sessions
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/:id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/sessions/:id/next", post(handlers::next_step))
        .route("/sessions/:id/back", post(handlers::previous_step))
        .route("/sessions/:id/reset", post(handlers::reset_session))
        .route("/sessions/:id/gender", put(handlers::select_gender))
        .route("/sessions/:id/style", put(handlers::select_style))
        .route("/sessions/:id/temperature", put(handlers::set_temperature))
        .route("/sessions/:id/result", get(handlers::session_result))
}
