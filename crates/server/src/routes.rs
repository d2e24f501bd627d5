use axum::{
    http::StatusCode,
    routing::{get, post},
    extract::State,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use models::ResourceConfig;
use service::{metrics, StoreRegistry};

pub mod records;

#[derive(Clone)]
pub struct ServerState {
    pub registry: StoreRegistry,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn metrics_handler() -> (StatusCode, String) {
    match metrics::encode_metrics() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}")),
    }
}

/// Configuration of every served resource.
pub async fn list_resources(State(state): State<ServerState>) -> Json<Vec<ResourceConfig>> {
    Json(state.registry.resources())
}

/// Build the full application router: service routes plus one generic set of record routes.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let service_routes = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route("/resources", get(list_resources));

    let record_routes = Router::new()
        .route("/:resource", get(records::list).post(records::create))
        .route(
            "/:resource/adicionar",
            post(records::create)
                .get(records::get_by_segment)
                .put(records::update_by_segment)
                .delete(records::delete_by_segment),
        )
        .route("/:resource/name/:term", get(records::search_by_name))
        // fixed segments below double as record ids for PUT and DELETE
        .route(
            "/:resource/search",
            get(records::find_by_field).put(records::update_by_segment).delete(records::delete_by_segment),
        )
        .route(
            "/:resource/data",
            get(records::find_by_date_range).put(records::update_by_segment).delete(records::delete_by_segment),
        )
        .route("/:resource/data/:start", get(records::find_by_date_range))
        .route("/:resource/data/:start/:end", get(records::find_by_date_range))
        .route(
            "/:resource/:id",
            get(records::get_one).put(records::update).delete(records::delete),
        );

    service_routes
        .merge(record_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one span per request with method and path
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status code and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
