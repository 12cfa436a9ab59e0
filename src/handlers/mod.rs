pub mod health;
pub mod resource;

use axum::{http::Method, routing::get, Router};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::database::models::{Entity, Product, Store};
use crate::database::DynRepository;
use crate::error::ApiError;

pub use health::HealthState;
pub use resource::ResourceState;

/// Storage the router serves from.
pub struct Services {
    pub products: DynRepository<Product>,
    pub stores: DynRepository<Store>,
    /// Set when the repositories are backed by PostgreSQL.
    pub pool: Option<PgPool>,
}

pub fn build_router(config: &AppConfig, services: Services) -> Router {
    let health_state = HealthState {
        environment: config.environment,
        pool: services.pool,
        timeout: config.query_timeout(),
    };

    Router::new()
        .route(
            "/api/v1/healthcheck",
            get(health::healthcheck).fallback(method_not_allowed),
        )
        .with_state(health_state)
        .merge(resource_routes(config, services.products))
        .merge(resource_routes(config, services.stores))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// List and CRUD routes for one entity under `/api/v1/{table}`.
fn resource_routes<T: Entity>(config: &AppConfig, repo: DynRepository<T>) -> Router {
    let state = ResourceState {
        repo,
        default_page_size: config.filter.default_page_size,
        debug_logging: config.filter.debug_logging,
    };
    let collection = format!("/api/v1/{}", T::LIST.table);
    let member = format!("{collection}/:id");

    Router::new()
        .route(
            &collection,
            get(resource::list::<T>)
                .post(resource::create::<T>)
                .fallback(method_not_allowed),
        )
        .route(
            &member,
            get(resource::show::<T>)
                .put(resource::update::<T>)
                .delete(resource::remove::<T>)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::resource_not_found()
}

async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::method_not_allowed(&method)
}
