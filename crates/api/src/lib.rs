//! HTTP API server with observability for the POS catalog.
//!
//! Provides REST endpoints for reading and partially updating products,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use application::{CatalogPorts, UpdateProduct};
use axum::Router;
use axum::routing::get;
use domain::{
    CoffeeBeanRepository, ProductCategoryRepository, ProductCoffeeBrewRepository,
    ProductQueryService, ProductRepository, StockRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::products::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/products/{id}",
            get(routes::products::get).patch(routes::products::update),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with every port served by `store`.
pub fn create_state<S>(store: S, update_timeout: Duration) -> Arc<AppState>
where
    S: ProductQueryService
        + ProductRepository
        + ProductCategoryRepository
        + CoffeeBeanRepository
        + StockRepository
        + ProductCoffeeBrewRepository
        + 'static,
{
    let ports = CatalogPorts::from_store(store);
    Arc::new(AppState {
        products: ports.query.clone(),
        update_product: UpdateProduct::new(ports).with_timeout(update_timeout),
    })
}
