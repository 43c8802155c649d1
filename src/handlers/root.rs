use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::models::{Client, Resource, TravelLog, User};

/// GET / - service information
pub async fn home() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Travel Log API",
        "version": version,
        "description": "REST API for clients, users and travel logs",
        "endpoints": {
            "health": "/health",
            "api": "/api",
            "docs": "/api-docs",
            "clients": "/api/clients[/:id]",
            "users": "/api/users[/:id]",
            "travel_logs": "/api/travel_logs[/:id]",
        }
    }))
}

/// GET /api - welcome message
pub async fn api_index() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the API. Documentation is available at /api-docs."
    }))
}

/// GET /api-docs - route and field reference for every resource
pub async fn docs() -> Json<Value> {
    Json(json!({
        "title": "API Server",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "RESTful API server documentation.",
        "resources": [
            resource_doc::<Client>(),
            resource_doc::<User>(),
            resource_doc::<TravelLog>(),
        ]
    }))
}

fn resource_doc<R: Resource>() -> Value {
    let collection = format!("/api/{}", R::PATH);
    let item = format!("/api/{}/{{id}}", R::PATH);

    json!({
        "name": R::LABEL,
        "identity": R::ID_COLUMN,
        "fields": R::COLUMNS,
        "required": R::REQUIRED,
        "routes": [
            { "method": "GET", "path": collection, "summary": format!("List all {}", R::PLURAL), "responses": [200] },
            { "method": "GET", "path": item, "summary": format!("Get a {} by ID", R::SINGULAR), "responses": [200, 400, 404] },
            { "method": "POST", "path": collection, "summary": format!("Create a {}", R::SINGULAR), "responses": [201, 400, 409] },
            { "method": "PUT", "path": item, "summary": format!("Update a {}; omitted fields are kept", R::SINGULAR), "responses": [200, 400, 404, 409] },
            { "method": "DELETE", "path": item, "summary": format!("Delete a {}", R::SINGULAR), "responses": [200, 400, 404, 409] },
        ]
    })
}

/// GET /health - liveness plus a database ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}

/// Fallback for any unmatched method and path
pub async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
