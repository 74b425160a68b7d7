use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router, middleware};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::{metrics_app, metrics_middleware};
use crate::modules::admin::init_admin_router;
use crate::modules::announcements::init_announcements_router;
use crate::modules::assignments::init_assignments_router;
use crate::modules::auth::init_auth_router;
use crate::modules::classrooms::init_classrooms_router;
use crate::modules::courses::init_courses_router;
use crate::modules::submissions::init_submissions_router;
use crate::modules::users::init_users_router;
use crate::state::AppState;

/// Room for the multipart framing and text fields around the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "message": "API is running" }))
}

async fn route_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Route not found" })))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true)
}

pub fn init_router(state: AppState, metrics: Option<PrometheusHandle>) -> Router {
    let upload_limit = state.upload_config.max_bytes + MULTIPART_OVERHEAD_BYTES;

    let api = Router::new()
        .nest("/auth", init_auth_router())
        .nest("/users", init_users_router())
        .nest("/courses", init_courses_router())
        .nest("/classrooms", init_classrooms_router())
        .nest("/assignments", init_assignments_router())
        .nest("/announcements", init_announcements_router())
        .nest(
            "/submissions",
            init_submissions_router().layer(DefaultBodyLimit::max(upload_limit)),
        )
        .nest("/admin", init_admin_router());

    let mut router = Router::new()
        .route("/", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest("/api", api);

    // Only a local path prefix can be served; an absolute base URL points elsewhere.
    let upload_prefix = state.upload_config.base_url.trim_end_matches('/');
    if upload_prefix.starts_with('/') && upload_prefix.len() > 1 {
        router = router.nest_service(upload_prefix, ServeDir::new(&state.upload_config.dir));
    }

    let mut router = router.fallback(route_not_found).with_state(state.clone());

    if let Some(handle) = metrics {
        router = router
            .merge(metrics_app(handle))
            .layer(middleware::from_fn(metrics_middleware));
    }

    router
        .layer(cors_layer(&state))
        .layer(middleware::from_fn(logging_middleware))
}
