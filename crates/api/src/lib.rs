//! HTTP API server with observability for the food-ordering service.
//!
//! Provides REST endpoints for order placement, status transitions and
//! owner reports, with structured logging (tracing), Prometheus metrics and
//! the `{status, data, message}` response envelope on every body.

pub mod auth;
pub mod config;
pub mod envelope;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use domain::OrderService;
use metrics_exporter_prometheus::PrometheusHandle;
use store::Storage;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Storage + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<S>))
        .route("/orders", get(routes::orders::list::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}", patch(routes::orders::update::<S>))
        .route(
            "/restaurants/{id}/orders",
            get(routes::orders::restaurant_orders::<S>),
        )
        .route(
            "/restaurants/{id}/reports/customer-spends",
            get(routes::reports::customer_spends::<S>),
        )
        .route(
            "/restaurants/{id}/reports/item-popularity",
            get(routes::reports::item_popularity::<S>),
        )
        .route(
            "/restaurants/{id}/reports/customer-favorites",
            get(routes::reports::customer_favorites::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .fallback(routes::not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the shared application state on the given storage.
pub fn create_state<S: Storage + Clone + 'static>(storage: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        order_service: OrderService::new(storage.clone()),
        storage,
    })
}
