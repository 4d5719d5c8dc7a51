//! Wire types exchanged with the notes service.
//!
//! Inbound values are never trusted as-is: they are decoded through
//! [`FromJson`], which checks every field and fills declared defaults.
//! Serde only encodes. Outbound requests are checked against the same
//! declared rules with [`validate::check`] before being sent.

pub mod validate;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

pub use validate::{FromJson, Rule, SchemaError, Violation};

use validate::{Fields, check_at};

/// Server-assigned note identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NoteId(Uuid);

impl NoteId {
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for NoteId {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| SchemaError::single("id", Rule::Identifier))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct Note {
    pub id: NoteId,
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    /// Comma-delimited labels, possibly empty.
    pub tags: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Tags split on commas, trimmed, empties dropped.
    pub fn tag_list(&self) -> impl Iterator<Item = &str> {
        self.tags.split(',').map(str::trim).filter(|t| !t.is_empty())
    }
}

impl FromJson for Note {
    fn from_json_at(value: &Value, path: &str, errors: &mut Vec<Violation>) -> Option<Self> {
        let mut fields = Fields::new(value, path, errors);
        let id = fields.identifier("id");
        let title = fields.string("title");
        let content = fields.string("content");
        let tags = fields.string_or("tags", "");
        let created_at = fields.timestamp("created_at");
        let updated_at = fields.timestamp("updated_at");

        if let (Some(created), Some(updated)) = (created_at, updated_at)
            && updated < created
        {
            fields.fail("updated_at", Rule::NotBefore("created_at"));
            return None;
        }

        let note = Self {
            id: NoteId(id?),
            title: title?,
            content: content?,
            tags: tags?,
            created_at: created_at?,
            updated_at: updated_at?,
        };
        check_at(&note, path, errors);
        Some(note)
    }
}

/// Body of `POST /notes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct CreateNoteRequest {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    pub tags: String,
}

impl CreateNoteRequest {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: String::new(),
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }
}

impl FromJson for CreateNoteRequest {
    fn from_json_at(value: &Value, path: &str, errors: &mut Vec<Violation>) -> Option<Self> {
        let mut fields = Fields::new(value, path, errors);
        let title = fields.string("title");
        let content = fields.string("content");
        let tags = fields.string_or("tags", "");
        let request = Self {
            title: title?,
            content: content?,
            tags: tags?,
        };
        check_at(&request, path, errors);
        Some(request)
    }
}

/// Body of `PUT /notes/{id}`. Only supplied fields are serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
pub struct UpdateNoteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub content: Option<String>,
    /// The service ignores an empty value, so `Some("")` leaves the stored
    /// tags unchanged rather than clearing them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

impl UpdateNoteRequest {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }
}

impl FromJson for UpdateNoteRequest {
    fn from_json_at(value: &Value, path: &str, errors: &mut Vec<Violation>) -> Option<Self> {
        let mut fields = Fields::new(value, path, errors);
        let request = Self {
            title: fields.optional_string("title"),
            content: fields.optional_string("content"),
            tags: fields.optional_string("tags"),
        };
        check_at(&request, path, errors);
        Some(request)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    /// Full server-side match count, not the page length.
    pub total: u64,
}

impl FromJson for Pagination {
    fn from_json_at(value: &Value, path: &str, errors: &mut Vec<Violation>) -> Option<Self> {
        let mut fields = Fields::new(value, path, errors);
        let page = fields.unsigned("page");
        let limit = fields.unsigned("limit");
        let total = fields.unsigned("total");
        Some(Self {
            page: page?,
            limit: limit?,
            total: total?,
        })
    }
}

/// Body of `GET /notes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotesResponse {
    pub notes: Vec<Note>,
    pub pagination: Pagination,
}

impl FromJson for NotesResponse {
    fn from_json_at(value: &Value, path: &str, errors: &mut Vec<Violation>) -> Option<Self> {
        let mut fields = Fields::new(value, path, errors);
        let notes = fields.array("notes");
        let pagination = fields.nested("pagination");
        Some(Self {
            notes: notes?,
            pagination: pagination?,
        })
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

impl FromJson for HealthResponse {
    fn from_json_at(value: &Value, path: &str, errors: &mut Vec<Violation>) -> Option<Self> {
        let mut fields = Fields::new(value, path, errors);
        let status = fields.string("status");
        let message = fields.string("message");
        let timestamp = fields.string("timestamp");
        Some(Self {
            status: status?,
            message: message?,
            timestamp: timestamp?,
        })
    }
}

/// Body of a successful `DELETE /notes/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteAck {
    pub message: String,
}

impl FromJson for DeleteAck {
    fn from_json_at(value: &Value, path: &str, errors: &mut Vec<Violation>) -> Option<Self> {
        let mut fields = Fields::new(value, path, errors);
        Some(Self {
            message: fields.string("message")?,
        })
    }
}
