pub mod health;

use axum::{
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};

use crate::auth::require_admin;
use crate::feedback::handlers;
use crate::render;
use crate::state::AppState;

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(render::not_found_page()))
}

pub fn build_router(state: AppState) -> Router {
    let reviewer_pages = Router::new()
        .route("/", get(handlers::handle_home))
        .route("/fetch_feedback", post(handlers::handle_fetch_feedback))
        .route("/feedback/:candidate_id", get(handlers::handle_feedback))
        .route("/treb", get(handlers::handle_intern_search))
        .route(
            "/fetch_internevals",
            post(handlers::handle_fetch_intern_evals),
        )
        .route(
            "/trebuchet/:candidate_id",
            get(handlers::handle_intern_feedback),
        )
        .route(
            "/ballista/:candidate_id",
            get(handlers::handle_ballista_feedback),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(health::health_handler))
        .merge(reviewer_pages)
        .fallback(not_found)
        .with_state(state)
}
