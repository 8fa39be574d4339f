use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::API_PREFIX;
use crate::db::ItemStore;
use crate::handlers::health::health_handler;
use crate::handlers::items::{create_item, delete_item, get_item, list_items, update_item};

/// Shared handler state. Holds the store handle injected at startup.
#[derive(Clone)]
pub struct AppState<S> {
    pub store: S,
}

impl<S: ItemStore> AppState<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

pub fn app_router<S: ItemStore>(state: AppState<S>) -> Router {
    let items = Router::new()
        .route("/items", get(list_items::<S>).post(create_item::<S>))
        .route(
            "/items/{id}",
            get(get_item::<S>)
                .put(update_item::<S>)
                .delete(delete_item::<S>),
        )
        .with_state(state);

    let api = Router::new().route("/health", get(health_handler)).merge(items);

    Router::new()
        .nest(API_PREFIX, api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
