use std::sync::Arc;

use axum::{routing::get, routing::post, Router};

use crate::features::provinces::handlers;
use crate::features::provinces::services::ProvinceService;

/// Create routes for the provinces feature
pub fn routes(service: Arc<ProvinceService>) -> Router {
    Router::new()
        .route(
            "/api/provinces",
            get(handlers::list_provinces).post(handlers::save_province),
        )
        // Static segments must come before {id}
        .route("/api/provinces/conditional", get(handlers::search_provinces))
        .route(
            "/api/provinces/with-cities",
            post(handlers::save_province_with_cities),
        )
        .route(
            "/api/provinces/{id}",
            get(handlers::get_province).delete(handlers::delete_province),
        )
        .route("/api/provinces/{id}/cities", get(handlers::list_cities))
        .with_state(service)
}
