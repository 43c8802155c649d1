use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::DatabaseManager;
use crate::handlers::{resource, root};
use crate::middleware::panic_response;
use crate::models::{Client, Resource, TravelLog, User};

/// Shared request state: the pool and the configuration it was built from
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseManager,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: DatabaseManager, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let production = state.config.is_production();
    let body_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Public
        .route("/", get(root::home))
        .route("/health", get(root::health))
        .route("/api-docs", get(root::docs))
        // Resource API
        .nest("/api", api_routes())
        .fallback(root::route_not_found)
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(move |payload: Box<dyn Any + Send + 'static>| {
            panic_response(payload, production)
        }))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root::api_index))
        .merge(resource_routes::<Client>())
        .merge(resource_routes::<User>())
        .merge(resource_routes::<TravelLog>())
}

/// The five routes of one resource. Unsupported methods on these paths get the 404 fallback.
pub fn resource_routes<R: Resource>() -> Router<AppState> {
    Router::new()
        .route(
            &format!("/{}", R::PATH),
            get(resource::list::<R>)
                .post(resource::create::<R>)
                .fallback(root::route_not_found),
        )
        .route(
            &format!("/{}/:id", R::PATH),
            get(resource::get::<R>)
                .put(resource::update::<R>)
                .delete(resource::delete::<R>)
                .fallback(root::route_not_found),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_credentials(true)
}
