use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, patch},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{handlers, middleware, openapi::ApiDoc};

pub fn build_router(state: Arc<crate::AppState>) -> Result<Router, String> {
    let origin = state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| format!("Invalid CORS_ORIGIN {:?}: {}", state.config.cors_origin, e))?;

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static(middleware::REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(middleware::REQUEST_ID_HEADER)])
        .allow_credentials(true);

    // Shift swap routes; /dashboard is a static segment and wins over /{id}
    let shift_swap_routes = Router::new()
        .route(
            "/",
            get(handlers::shift_swaps_handler::list_shift_swaps)
                .post(handlers::shift_swaps_handler::create_shift_swap),
        )
        .route("/dashboard", get(handlers::shift_swaps_handler::get_dashboard))
        .route("/{id}", get(handlers::shift_swaps_handler::get_shift_swap))
        .route("/{id}/respond", patch(handlers::shift_swaps_handler::respond_to_shift_swap))
        .route("/{id}/cancel", patch(handlers::shift_swaps_handler::cancel_shift_swap))
        .route("/{id}/complete", patch(handlers::shift_swaps_handler::complete_shift_swap));

    let assignment_routes = Router::new().route(
        "/",
        get(handlers::assignments_handler::get_swappable_assignments),
    );

    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/shift-swaps", shift_swap_routes)
        .nest("/api/shift-assignments", assignment_routes)
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .layer(axum_middleware::from_fn(middleware::metrics_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    Ok(router)
}
