//! REST API Routes Module
//!
//! Transport glue only: path/param parsing, request validation, and mapping
//! of the interactor's typed results onto wire-level status codes and
//! bodies. All behavior lives behind [`crate::interactor::GoodsInteractor`].

pub mod goods;
pub mod health;

use crate::state::AppState;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the service router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/v1/good/create/:project_id", post(goods::create_good))
        .route(
            "/api/v1/good/update/:id/:project_id",
            patch(goods::update_good),
        )
        .route(
            "/api/v1/good/remove/:id/:project_id",
            delete(goods::remove_good),
        )
        .route("/api/v1/goods/list", get(goods::list_goods))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
