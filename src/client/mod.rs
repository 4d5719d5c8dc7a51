//! Transport client for the notes service.

mod rest;

pub use rest::RestClient;

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::schema::{
    CreateNoteRequest, DeleteAck, HealthResponse, Note, NoteId, NotesResponse, UpdateNoteRequest,
};

/// Query for `GET /notes`. Unset fields are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

impl ListParams {
    #[must_use]
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Key/value pairs for the parameters actually supplied.
    /// An empty search term counts as not supplied.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

/// Remote note operations, one per resource action.
#[async_trait]
pub trait NotesApi: Send + Sync {
    /// `GET /health`, decoded.
    async fn health_check(&self) -> ClientResult<HealthResponse>;

    async fn list_notes(&self, params: &ListParams) -> ClientResult<NotesResponse>;

    async fn get_note(&self, id: &NoteId) -> ClientResult<Note>;

    async fn create_note(&self, request: &CreateNoteRequest) -> ClientResult<Note>;

    async fn update_note(&self, id: &NoteId, request: &UpdateNoteRequest) -> ClientResult<Note>;

    async fn delete_note(&self, id: &NoteId) -> ClientResult<DeleteAck>;

    /// Liveness as a plain boolean. Never fails.
    async fn health(&self) -> bool {
        match self.health_check().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Health check failed: {}", e);
                false
            }
        }
    }
}
