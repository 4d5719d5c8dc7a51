pub mod dto;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use std::sync::Arc;

use handlers::rest;
use repository::Repository;
use service::NoteService;

pub const API_PREFIX: &str = "/api/v1";

/// Origins of the desktop client.
const ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:1420", "tauri://localhost"];

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(ALLOWED_ORIGINS.map(HeaderValue::from_static))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
}

pub fn router(service: Arc<NoteService>) -> Router {
    let api = Router::new()
        .route("/health", get(rest::health_check))
        .route("/notes", get(rest::get_all_notes).post(rest::create_note))
        .route(
            "/notes/{id}",
            get(rest::get_one_note)
                .put(rest::update_note)
                .delete(rest::delete_note),
        )
        .with_state(service);

    Router::new()
        .nest(API_PREFIX, api)
        .route(
            "/api-doc/openapi.json",
            get(|| async { Json(rest::ApiDoc::openapi()) }),
        )
        .layer(cors())
        .layer(TraceLayer::new_for_http())
}

/// Router over a fresh, empty repository.
pub fn app() -> Router {
    let repo = Arc::new(tokio::sync::Mutex::new(Repository::new()));
    router(Arc::new(NoteService::new(repo)))
}
