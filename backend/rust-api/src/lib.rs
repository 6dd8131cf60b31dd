use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use services::AppState;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Metrics endpoint with Basic Auth protection
        .route(
            "/metrics",
            get(handlers::metrics_handler).layer(middleware::from_fn_with_state(
                app_state.clone(),
                handlers::metrics_auth_middleware,
            )),
        )
        .nest("/api/surveys", survey_routes())
        .nest("/api/questions", question_routes())
        .nest("/api/responses", response_routes())
        .layer(cors_layer(&app_state.config))
        .with_state(app_state)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(middleware::from_fn(
            middlewares::trace::trace_context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn survey_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(handlers::surveys::list_surveys).post(handlers::surveys::create_survey),
        )
        .route(
            "/{id}",
            get(handlers::surveys::get_survey)
                .put(handlers::surveys::update_survey)
                .delete(handlers::surveys::delete_survey),
        )
}

fn question_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", axum::routing::post(handlers::questions::create_question))
        .route(
            "/{id}",
            get(handlers::questions::get_question)
                .put(handlers::questions::update_question)
                .delete(handlers::questions::delete_question),
        )
}

fn response_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(handlers::responses::list_responses).post(handlers::responses::submit_response),
        )
        .route("/{id}", get(handlers::responses::get_response))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::LOCATION]);

    match config
        .cors_allowed_origin
        .as_deref()
        .and_then(|origin| HeaderValue::from_str(origin).ok())
    {
        Some(origin) => cors.allow_origin(origin),
        None => cors.allow_origin(tower_http::cors::Any),
    }
}
