// src/routes.rs

use axum::{
    Router,
    http::{Method, header},
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    handlers::{health, store},
    state::AppState,
};

/// Assembles the main application router.
///
/// * `/api/quiz` is the key-value store endpoint (`?type=quiz|students&quizId=..`).
/// * `/lectures` serves the lecture directory and its `index.json` manifest.
/// * Applies global middleware (Trace, CORS open to every origin).
///   The CORS layer answers every `OPTIONS` request with an empty 200.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let store_route = get(store::get_record)
        .post(store::save_record)
        .delete(store::delete_record);

    let lectures = ServeDir::new(&state.config.lectures_dir);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/quiz", store_route)
        .nest_service("/lectures", lectures)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
