//! Local note collection kept in step with the notes service.
//!
//! The collection only ever changes after the service confirms an
//! operation. Failed calls leave it untouched and hand the error back.

mod selection;

pub use selection::Selection;

use std::collections::HashSet;
use std::sync::Arc;

use crate::client::{ListParams, NotesApi};
use crate::error::ClientResult;
use crate::schema::{CreateNoteRequest, DeleteAck, Note, NoteId, NotesResponse, UpdateNoteRequest};

/// Result of settling a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The collection now holds this response; `total` is the server match count.
    Applied { total: u64 },
    /// A later refresh was issued; this result was dropped.
    Superseded,
}

/// A refresh that has been issued a token but not fetched yet.
///
/// Holds its own handle to the API so several can be in flight while the
/// store stays borrowable.
#[derive(Debug)]
pub struct PendingRefresh<A: ?Sized> {
    token: u64,
    params: ListParams,
    api: Arc<A>,
}

impl<A: NotesApi + ?Sized> PendingRefresh<A> {
    #[must_use]
    pub const fn token(&self) -> u64 {
        self.token
    }

    pub async fn fetch(self) -> FetchedRefresh {
        let result = self.api.list_notes(&self.params).await;
        FetchedRefresh {
            token: self.token,
            search: self.params.search,
            result,
        }
    }
}

/// A fetched refresh waiting to be applied with [`NoteStore::settle`].
#[derive(Debug)]
pub struct FetchedRefresh {
    token: u64,
    search: Option<String>,
    result: ClientResult<NotesResponse>,
}

impl FetchedRefresh {
    #[must_use]
    pub const fn token(&self) -> u64 {
        self.token
    }
}

pub struct NoteStore<A: ?Sized> {
    api: Arc<A>,
    notes: Vec<Note>,
    selection: Selection,
    query: Option<String>,
    total: u64,
    page_limit: Option<u32>,
    /// Token of the most recently issued refresh.
    issued: u64,
}

impl<A: NotesApi + ?Sized> NoteStore<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            notes: Vec::new(),
            selection: Selection::Idle,
            query: None,
            total: 0,
            page_limit: None,
            issued: 0,
        }
    }

    #[must_use]
    pub const fn with_page_limit(mut self, limit: Option<u32>) -> Self {
        self.page_limit = limit;
        self
    }

    /// Notes in server order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| &n.id == id)
    }

    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Search term of the last applied refresh.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Server-side match count as of the last applied refresh. Creates and
    /// deletes since then are not counted.
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Invalidates every outstanding refresh. Their snapshots predate a
    /// confirmed change and would undo it.
    fn supersede_pending(&mut self) {
        self.issued += 1;
    }

    /// Issues a new refresh token; every earlier refresh is superseded.
    pub fn begin_refresh(&mut self, search: Option<&str>) -> PendingRefresh<A> {
        self.issued += 1;
        let params = ListParams {
            page: None,
            limit: self.page_limit,
            search: search.filter(|s| !s.is_empty()).map(ToString::to_string),
        };
        tracing::debug!("Issued refresh {} for {:?}", self.issued, params.search);
        PendingRefresh {
            token: self.issued,
            params,
            api: Arc::clone(&self.api),
        }
    }

    /// Applies `fetched` if no newer refresh has been issued since.
    ///
    /// # Errors
    ///
    /// Returns the fetch error of the current refresh; the collection is
    /// left as it was. Errors of superseded refreshes are dropped.
    pub fn settle(&mut self, fetched: FetchedRefresh) -> ClientResult<RefreshOutcome> {
        if fetched.token != self.issued {
            tracing::debug!(
                "Discarding refresh {} (latest is {})",
                fetched.token,
                self.issued
            );
            return Ok(RefreshOutcome::Superseded);
        }

        let response = fetched.result.inspect_err(|e| {
            tracing::warn!("Failed to refresh notes: {}", e);
        })?;

        self.notes = dedup_by_id(response.notes);
        self.query = fetched.search;
        self.total = response.pagination.total;

        let fresh = self
            .selection
            .note()
            .and_then(|selected| self.notes.iter().find(|n| n.id == selected.id))
            .cloned();
        if let Some(note) = fresh {
            self.selection = Selection::Editing(note);
        }

        Ok(RefreshOutcome::Applied { total: self.total })
    }

    /// Replaces the collection with the notes matching `search`.
    ///
    /// # Errors
    ///
    /// Propagates the list failure; the collection is left as it was.
    pub async fn refresh(&mut self, search: Option<&str>) -> ClientResult<RefreshOutcome> {
        let fetched = self.begin_refresh(search).fetch().await;
        self.settle(fetched)
    }

    /// Creates a note remotely and prepends the confirmed copy.
    ///
    /// # Errors
    ///
    /// Propagates the create failure; nothing changes locally.
    pub async fn create(&mut self, request: &CreateNoteRequest) -> ClientResult<Note> {
        let note = self.api.create_note(request).await.inspect_err(|e| {
            tracing::warn!("Failed to create note: {}", e);
        })?;

        self.supersede_pending();
        self.notes.retain(|n| n.id != note.id);
        self.notes.insert(0, note.clone());
        if self.selection.is_creating() {
            self.selection = Selection::Idle;
        }

        tracing::info!("Created note {}", note.id);
        Ok(note)
    }

    /// Updates a note remotely and swaps in the server's copy in place.
    ///
    /// # Errors
    ///
    /// Propagates the update failure; nothing changes locally.
    pub async fn update(&mut self, id: &NoteId, request: &UpdateNoteRequest) -> ClientResult<Note> {
        let note = self.api.update_note(id, request).await.inspect_err(|e| {
            tracing::warn!("Failed to update note {}: {}", id, e);
        })?;

        self.supersede_pending();
        self.replace(&note);
        tracing::info!("Updated note {}", note.id);
        Ok(note)
    }

    /// Deletes a note remotely, then drops it locally.
    ///
    /// # Errors
    ///
    /// Propagates the delete failure; nothing changes locally.
    pub async fn delete(&mut self, id: &NoteId) -> ClientResult<DeleteAck> {
        let ack = self.api.delete_note(id).await.inspect_err(|e| {
            tracing::warn!("Failed to delete note {}: {}", id, e);
        })?;

        self.supersede_pending();
        self.notes.retain(|n| &n.id != id);
        if self.selection.is_editing(id) {
            self.selection = Selection::Idle;
        }

        tracing::info!("Deleted note {}", id);
        Ok(ack)
    }

    /// Re-fetches one note and swaps it in place.
    ///
    /// # Errors
    ///
    /// Propagates the fetch failure; nothing changes locally.
    pub async fn reload(&mut self, id: &NoteId) -> ClientResult<Note> {
        let note = self.api.get_note(id).await?;
        self.supersede_pending();
        self.replace(&note);
        Ok(note)
    }

    pub fn select(&mut self, selection: Selection) {
        self.selection = selection;
    }

    /// Opens a note from the local collection. Returns `false` if it is not held.
    pub fn open(&mut self, id: &NoteId) -> bool {
        match self.get(id).cloned() {
            Some(note) => {
                self.selection = Selection::Editing(note);
                true
            }
            None => false,
        }
    }

    fn replace(&mut self, note: &Note) {
        if let Some(slot) = self.notes.iter_mut().find(|n| n.id == note.id) {
            slot.clone_from(note);
        }
        if self.selection.is_editing(&note.id) {
            self.selection = Selection::Editing(note.clone());
        }
    }
}

/// Keeps the first occurrence of each id, preserving order.
fn dedup_by_id(notes: Vec<Note>) -> Vec<Note> {
    let mut seen = HashSet::with_capacity(notes.len());
    let before = notes.len();
    let unique: Vec<Note> = notes.into_iter().filter(|n| seen.insert(n.id)).collect();
    if unique.len() != before {
        tracing::warn!("Dropped {} duplicate notes from response", before - unique.len());
    }
    unique
}
