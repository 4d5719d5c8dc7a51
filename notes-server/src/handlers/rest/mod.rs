use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use utoipa::OpenApi;
use uuid::Uuid;

use std::sync::Arc;

use crate::{
    dto::{
        CreateNoteRequest, ErrorResponse, HealthResponse, MessageResponse, NoteResponse,
        NotesQuery, NotesResponse, Pagination, UpdateNoteRequest,
    },
    service::{NoteService, ServiceError},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        create_note,
        update_note,
        delete_note,
        get_one_note,
        get_all_notes
    ),
    components(schemas(
        NoteResponse,
        NotesResponse,
        Pagination,
        CreateNoteRequest,
        UpdateNoteRequest,
        HealthResponse,
        MessageResponse,
        ErrorResponse
    )),
    tags(
        (name = "notes", description = "Notes management API")
    )
)]
pub struct ApiDoc;

fn error_response(status: StatusCode, error: impl Into<String>, details: Option<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            details,
        }),
    )
        .into_response()
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(msg) => error_response(StatusCode::BAD_REQUEST, msg, None),
            Self::NotFound => error_response(StatusCode::NOT_FOUND, "Note not found", None),
        }
    }
}

/// Ids that are not UUIDs cannot name a stored note.
fn parse_id(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::NotFound)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn health_check(State(service): State<Arc<NoteService>>) -> Response {
    (StatusCode::OK, Json(service.health())).into_response()
}

#[utoipa::path(
    post,
    path = "/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created successfully", body = NoteResponse),
        (status = 400, description = "Missing title or content", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn create_note(
    State(service): State<Arc<NoteService>>,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!("rejected create request: {}", rejection.body_text());
            return error_response(
                StatusCode::BAD_REQUEST,
                "Invalid request body",
                Some(rejection.body_text()),
            );
        }
    };

    match service.create_note(payload).await {
        Ok(note) => (StatusCode::CREATED, Json(note)).into_response(),
        Err(e) => {
            tracing::warn!("failed to create note entry: {}", e);
            e.into_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/notes/{id}",
    params(
        ("id" = String, Path, description = "Note ID")
    ),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated successfully", body = NoteResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 404, description = "Note not found", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn update_note(
    State(service): State<Arc<NoteService>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Invalid request body",
                Some(rejection.body_text()),
            );
        }
    };

    let result = match parse_id(&id) {
        Ok(id) => service.update_note(id, payload).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(note) => (StatusCode::OK, Json(note)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/notes/{id}",
    params(
        ("id" = String, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note deleted successfully", body = MessageResponse),
        (status = 404, description = "Note not found", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn delete_note(State(service): State<Arc<NoteService>>, Path(id): Path<String>) -> Response {
    let result = match parse_id(&id) {
        Ok(id) => service.delete_note(id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Note deleted successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/notes/{id}",
    params(
        ("id" = String, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note found", body = NoteResponse),
        (status = 404, description = "Note not found", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_one_note(
    State(service): State<Arc<NoteService>>,
    Path(id): Path<String>,
) -> Response {
    let result = match parse_id(&id) {
        Ok(id) => service.get_one_note(id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(note) => (StatusCode::OK, Json(note)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/notes",
    params(NotesQuery),
    responses(
        (status = 200, description = "One page of matching notes", body = NotesResponse),
        (status = 400, description = "Malformed query", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_all_notes(
    State(service): State<Arc<NoteService>>,
    query: Result<Query<NotesQuery>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(query)) => (StatusCode::OK, Json(service.get_all_notes(query).await)).into_response(),
        Err(rejection) => error_response(
            StatusCode::BAD_REQUEST,
            "Invalid query parameters",
            Some(rejection.body_text()),
        ),
    }
}
