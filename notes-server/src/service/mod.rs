use crate::{
    dto::{
        CreateNoteRequest, HealthResponse, NoteResponse, NotesQuery, NotesResponse, Pagination,
        UpdateNoteRequest,
    },
    repository::Repository,
};

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("Note not found")]
    NotFound,
}

#[derive(Clone)]
pub struct NoteService {
    repo: Arc<tokio::sync::Mutex<Repository>>,
}

impl NoteService {
    pub const fn new(repo: Arc<tokio::sync::Mutex<Repository>>) -> Self {
        Self { repo }
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "ok".to_string(),
            message: "QuickNotes API is running".to_string(),
            timestamp: Utc::now(),
        }
    }

    pub async fn create_note(
        &self,
        request: CreateNoteRequest,
    ) -> Result<NoteResponse, ServiceError> {
        let mut missing = Vec::new();
        if request.title.is_empty() {
            missing.push("title");
        }
        if request.content.is_empty() {
            missing.push("content");
        }
        if !missing.is_empty() {
            return Err(ServiceError::Validation(format!(
                "{} required",
                missing.join(" and ")
            )));
        }

        let note = self
            .repo
            .lock()
            .await
            .create_note(request.title, request.content, request.tags);
        tracing::info!("Created note {}", note.id);
        Ok(note.into())
    }

    pub async fn update_note(
        &self,
        id: Uuid,
        request: UpdateNoteRequest,
    ) -> Result<NoteResponse, ServiceError> {
        self.repo
            .lock()
            .await
            .update_note(id, request.title, request.content, request.tags)
            .map(Into::into)
            .ok_or(ServiceError::NotFound)
    }

    pub async fn delete_note(&self, id: Uuid) -> Result<(), ServiceError> {
        if self.repo.lock().await.delete_note(id) {
            tracing::info!("Deleted note {}", id);
            Ok(())
        } else {
            Err(ServiceError::NotFound)
        }
    }

    pub async fn get_one_note(&self, id: Uuid) -> Result<NoteResponse, ServiceError> {
        self.repo
            .lock()
            .await
            .get_one_note(id)
            .map(Into::into)
            .ok_or(ServiceError::NotFound)
    }

    pub async fn get_all_notes(&self, query: NotesQuery) -> NotesResponse {
        let page = query.page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE);
        let limit = query.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT);
        let offset = (page as usize - 1) * limit as usize;

        let (notes, total) = self.repo.lock().await.search_notes(
            query.search.as_deref().filter(|s| !s.is_empty()),
            offset,
            limit as usize,
        );

        NotesResponse {
            notes: notes.into_iter().map(Into::into).collect(),
            pagination: Pagination {
                page,
                limit,
                total: total as u64,
            },
        }
    }
}
