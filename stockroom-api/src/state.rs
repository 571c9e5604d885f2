//! Shared application state for Axum routers.

use crate::interactor::GoodsInteractor;
use std::sync::Arc;

/// Application-wide state shared across all routes.
///
/// Handlers only see the interactor: transport glue never talks to the
/// repository, cache, or bus directly.
#[derive(Clone)]
pub struct AppState {
    pub interactor: Arc<GoodsInteractor>,
}

impl AppState {
    pub fn new(interactor: Arc<GoodsInteractor>) -> Self {
        Self { interactor }
    }
}
