//! In-memory stand-in for the notes service, for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::client::{ListParams, NotesApi};
use crate::error::{ClientError, ClientResult};
use crate::schema::{
    CreateNoteRequest, DeleteAck, HealthResponse, Note, NoteId, NotesResponse, Pagination,
    UpdateNoteRequest,
};

#[derive(Default)]
pub struct FakeApi {
    notes: Mutex<Vec<Note>>,
    unreachable: AtomicBool,
    fail_next: Mutex<Option<ClientError>>,
    calls: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes(titles: &[(&str, &str)]) -> Self {
        let api = Self::new();
        {
            let mut notes = api.notes.lock().unwrap();
            for (title, content) in titles {
                notes.push(sample_note(title, content));
            }
        }
        api
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// The next call fails with `err` instead of touching state.
    pub fn fail_next(&self, err: ClientError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn remote_notes(&self) -> Vec<Note> {
        self.notes.lock().unwrap().clone()
    }

    fn gate(&self) -> ClientResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(ClientError::NetworkUnreachable {
                message: "connection refused".to_string(),
            });
        }
        self.fail_next.lock().unwrap().take().map_or(Ok(()), Err)
    }
}

pub fn sample_note(title: &str, content: &str) -> Note {
    let now = Utc::now();
    Note {
        id: NoteId::new(Uuid::new_v4()),
        title: title.to_string(),
        content: content.to_string(),
        tags: String::new(),
        created_at: now,
        updated_at: now,
    }
}

fn not_found() -> ClientError {
    ClientError::NotFound {
        message: "Note not found".to_string(),
        details: None,
    }
}

#[async_trait]
impl NotesApi for FakeApi {
    async fn health_check(&self) -> ClientResult<HealthResponse> {
        self.gate()?;
        Ok(HealthResponse {
            status: "ok".to_string(),
            message: "fake".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        })
    }

    async fn list_notes(&self, params: &ListParams) -> ClientResult<NotesResponse> {
        self.gate()?;
        let notes = self.notes.lock().unwrap();
        let term = params.search.clone().unwrap_or_default().to_lowercase();
        let matching: Vec<Note> = notes
            .iter()
            .filter(|n| {
                n.title.to_lowercase().contains(&term) || n.content.to_lowercase().contains(&term)
            })
            .cloned()
            .collect();

        let page = params.page.unwrap_or(1).max(1);
        let limit = params.limit.unwrap_or(10).max(1);
        let start = ((page - 1) * limit) as usize;
        Ok(NotesResponse {
            pagination: Pagination {
                page: page.into(),
                limit: limit.into(),
                total: matching.len() as u64,
            },
            notes: matching.into_iter().skip(start).take(limit as usize).collect(),
        })
    }

    async fn get_note(&self, id: &NoteId) -> ClientResult<Note> {
        self.gate()?;
        self.notes
            .lock()
            .unwrap()
            .iter()
            .find(|n| &n.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_note(&self, request: &CreateNoteRequest) -> ClientResult<Note> {
        self.gate()?;
        if request.title.is_empty() || request.content.is_empty() {
            return Err(ClientError::Validation {
                message: "title and content are required".to_string(),
                details: None,
                status: Some(400),
            });
        }
        let mut note = sample_note(&request.title, &request.content);
        note.tags.clone_from(&request.tags);
        self.notes.lock().unwrap().insert(0, note.clone());
        Ok(note)
    }

    async fn update_note(&self, id: &NoteId, request: &UpdateNoteRequest) -> ClientResult<Note> {
        self.gate()?;
        let mut notes = self.notes.lock().unwrap();
        let note = notes.iter_mut().find(|n| &n.id == id).ok_or_else(not_found)?;
        if let Some(title) = request.title.as_ref().filter(|v| !v.is_empty()) {
            note.title.clone_from(title);
        }
        if let Some(content) = request.content.as_ref().filter(|v| !v.is_empty()) {
            note.content.clone_from(content);
        }
        if let Some(tags) = request.tags.as_ref().filter(|v| !v.is_empty()) {
            note.tags.clone_from(tags);
        }
        note.updated_at = Utc::now().max(note.updated_at + Duration::microseconds(1));
        Ok(note.clone())
    }

    async fn delete_note(&self, id: &NoteId) -> ClientResult<DeleteAck> {
        self.gate()?;
        let mut notes = self.notes.lock().unwrap();
        let before = notes.len();
        notes.retain(|n| &n.id != id);
        if notes.len() == before {
            return Err(not_found());
        }
        Ok(DeleteAck {
            message: "Note deleted successfully".to_string(),
        })
    }
}
