use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::EngineError;
use crate::logic::BomEngine;
use crate::model::{
    DeepComposition, FlatComposition, Id, Ordering, OrderingSummary, ProductToOrdering,
    UserContext,
};
use crate::store::traits::Store;

pub type AppState<S> = Arc<BomEngine<S>>;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

pub fn error_status(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
        EngineError::AccessDenied { .. } => StatusCode::FORBIDDEN,
        EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::CyclicComposition { .. } => StatusCode::CONFLICT,
        EngineError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn engine_error(err: EngineError) -> (StatusCode, Json<ErrorResponse>) {
    let status = error_status(&err);
    if status.is_server_error() {
        log::error!("Request failed: {}", err);
    }
    (status, Json(ErrorResponse::new(&err.to_string())))
}

/// One-level composition of a product, grouped by variant list
pub async fn get_product_complex<S: Store>(
    State(engine): State<AppState<S>>,
    user: UserContext,
    Path(product_id): Path<Id>,
) -> ApiResult<FlatComposition> {
    engine
        .expand_flat(&user, product_id)
        .await
        .map(Json)
        .map_err(engine_error)
}

/// Full composition tree of a product
pub async fn get_product_deep<S: Store>(
    State(engine): State<AppState<S>>,
    user: UserContext,
    Path(product_id): Path<Id>,
) -> ApiResult<DeepComposition> {
    engine
        .expand_deep(&user, product_id)
        .await
        .map(Json)
        .map_err(engine_error)
}

/// Put a product on an order together with its default materials and operations
pub async fn create_product_to_ordering_default<S: Store>(
    State(engine): State<AppState<S>>,
    user: UserContext,
    RequestJson(new_link): RequestJson<ProductToOrdering>,
) -> ApiResult<ProductToOrdering> {
    engine
        .create_default(&user, new_link)
        .await
        .map(Json)
        .map_err(engine_error)
}

pub async fn materialize_product_to_ordering<S: Store>(
    State(engine): State<AppState<S>>,
    user: UserContext,
    Path(product_to_ordering_id): Path<Id>,
) -> ApiResult<ProductToOrdering> {
    engine
        .materialize_defaults(&user, product_to_ordering_id)
        .await
        .map(Json)
        .map_err(engine_error)
}

pub async fn get_ordering_summary<S: Store>(
    State(engine): State<AppState<S>>,
    user: UserContext,
    Path(ordering_id): Path<Id>,
) -> ApiResult<OrderingSummary> {
    engine
        .ordering_summary(&user, ordering_id)
        .await
        .map(Json)
        .map_err(engine_error)
}

/// Recompute an ordering's cost from its price and markup; nothing is stored
pub async fn update_ordering_cost(
    RequestJson(mut ordering): RequestJson<Ordering>,
) -> Json<Ordering> {
    ordering.update_cost();
    Json(ordering)
}
