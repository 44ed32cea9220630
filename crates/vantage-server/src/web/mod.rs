pub mod api;
pub mod pages;
pub mod protect;

use crate::state::AppState;
use axum::{Router, middleware, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    let state = Arc::new(state);

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::build_api_routes(state.clone()))
        .route(protect::LOGIN_PATH, get(pages::login_page))
        .route(protect::ADMIN_PREFIX, get(pages::admin_console))
        .route("/admin/{*path}", get(pages::admin_console))
        // Runs before every handler so navigation checks see the full path
        .layer(middleware::from_fn_with_state(
            state.clone(),
            protect::protect_routes,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
