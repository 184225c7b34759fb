use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers::{self, AppState};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Composition
        .route(
            "/product_complex/:id",
            get(handlers::get_product_complex::<S>),
        )
        .route("/product_deep/:id", get(handlers::get_product_deep::<S>))
        // Ordering
        .route(
            "/product_to_ordering_default",
            post(handlers::create_product_to_ordering_default::<S>),
        )
        .route(
            "/product_to_ordering/:id/materialize",
            post(handlers::materialize_product_to_ordering::<S>),
        )
        .route(
            "/ordering/:id/summary",
            get(handlers::get_ordering_summary::<S>),
        )
        .route(
            "/ordering/update_cost",
            post(handlers::update_ordering_cost),
        )
}
