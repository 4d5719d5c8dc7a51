//! Client-side synchronization layer for a personal notes service.
//!
//! [`client::RestClient`] talks to the service, [`schema`] checks every
//! value that crosses the wire, [`store::NoteStore`] holds the confirmed
//! note collection and [`connectivity::ConnectivityMonitor`] tracks whether
//! the service is reachable.

pub mod cli;
pub mod client;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod schema;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ListParams, NotesApi, RestClient};
pub use config::ClientConfig;
pub use connectivity::{Connectivity, ConnectivityMonitor};
pub use error::{ClientError, ClientResult};
pub use schema::{CreateNoteRequest, Note, NoteId, NotesResponse, UpdateNoteRequest};
pub use store::{NoteStore, RefreshOutcome, Selection};
