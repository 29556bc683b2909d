//! Router configuration.
//!
//! Builds the complete Axum router with all endpoints.

use crate::api::{self, admin, catalog, reservations, session, upload};
use crate::state::AppState;
use crate::uploads::{MAX_IMAGE_BYTES, PUBLIC_PREFIX};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, header},
    routing::{get, patch, post},
};
use booking_web::handlers::{health_check, readiness, websocket};
use booking_web::correlation_id_layer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// - `/health`, `/ready`, `/metrics`: operational endpoints
/// - `/api/reservations`, `/api/service-types`, `/api/vehicles`: public
/// - `/api/admin/*`: back office; everything except login, logout and check
///   requires an admin session
/// - `/uploads/*`: stored vehicle images
///
/// `cors_origins` lists browser origins allowed to call the API; an empty
/// list adds no CORS headers.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let admin_routes = Router::new()
        .route("/login", post(session::login))
        .route("/logout", post(session::logout))
        .route("/check", get(session::check))
        .route("/reservations", get(admin::list_reservations))
        .route("/reservations/:id", patch(admin::update_status))
        .route(
            "/service-types",
            get(catalog::list_service_types).post(catalog::create_service_type),
        )
        .route(
            "/service-types/:id",
            patch(catalog::rename_service_type).delete(catalog::delete_service_type),
        )
        .route(
            "/vehicles",
            get(catalog::list_vehicles).post(catalog::create_vehicle),
        )
        .route(
            "/vehicles/:id",
            patch(catalog::update_vehicle).delete(catalog::delete_vehicle),
        )
        .route(
            "/upload",
            post(upload::upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/ws", get(websocket::viewer));

    let api_routes = Router::new()
        .route("/reservations", post(reservations::submit))
        .route("/service-types", get(catalog::public_service_types))
        .route("/vehicles", get(catalog::public_vehicles))
        .nest("/admin", admin_routes);

    let uploaded_files = ServeDir::new(state.uploads.root());

    let router = Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
        .route("/metrics", get(api::metrics))
        .nest("/api", api_routes)
        .nest_service(PUBLIC_PREFIX, uploaded_files)
        .with_state(state)
        .layer(correlation_id_layer())
        .layer(TraceLayer::new_for_http());

    match cors_layer(cors_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// Multipart framing allowance on top of the image itself.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 64 * 1024;

const CORRELATION_ID: HeaderName = HeaderName::from_static("x-correlation-id");

/// CORS policy for the configured origins. Unparseable origins are skipped.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if allowed.is_empty() {
        return None;
    }

    tracing::info!(origins = ?origins, "CORS enabled");
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                CORRELATION_ID,
            ])
            .expose_headers([CORRELATION_ID])
            .allow_credentials(true),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_is_off_without_origins() {
        assert!(cors_layer(&[]).is_none());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_none());
    }

    #[test]
    fn cors_accepts_listed_origins() {
        assert!(cors_layer(&["https://book.example".to_string()]).is_some());
    }
}
