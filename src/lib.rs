pub mod api;
pub mod config;
pub mod models;
pub mod services;

use crate::config::RelayConfig;
use crate::services::telegram::Messenger;
use crate::api::middleware::request_id::REQUEST_ID_HEADER;
use axum::{
    Json, Router,
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Request, Response},
    middleware::from_fn,
    routing::{any, get},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Span;
use utoipa::OpenApi;

pub const UPLOAD_ROUTE: &str = "/api/telegram-upload";

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::upload::telegram_upload,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::upload::UploadForm,
            api::handlers::upload::UploadResponse,
            api::handlers::upload::MessageResponse,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "upload", description = "Card photo relay to Telegram"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: RelayConfig,
    pub messenger: Arc<dyn Messenger>,
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.body_limit();
    let cors = cors_layer(&state.config.allowed_origins);

    // CORS stays off the upload route so an OPTIONS preflight reaches the handler's 405
    let system_routes = Router::new()
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/health", get(api::handlers::health::health_check))
        .layer(cors);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get(&REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!("📥 {} {}", request.method(), request.uri());
        })
        .on_response(|response: &Response<Body>, latency: Duration, _span: &Span| {
            tracing::info!(
                "📤 Finished in {:?} with status {}",
                latency,
                response.status()
            );
        });

    Router::new()
        // Every method is routed so non-POST requests get the JSON 405 body
        .route(UPLOAD_ROUTE, any(api::handlers::upload::telegram_upload))
        .merge(system_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(trace_layer)
        // Outermost, so the trace span sees the generated id
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}
