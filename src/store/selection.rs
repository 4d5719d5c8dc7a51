use crate::schema::{Note, NoteId};

/// What the editor pane is showing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Idle,
    /// Composing a note that does not exist remotely yet.
    Creating,
    /// Viewing or editing an existing note; holds the last confirmed copy.
    Editing(Note),
}

impl Selection {
    #[must_use]
    pub const fn note(&self) -> Option<&Note> {
        match self {
            Self::Editing(note) => Some(note),
            Self::Idle | Self::Creating => None,
        }
    }

    #[must_use]
    pub fn is_editing(&self, id: &NoteId) -> bool {
        self.note().is_some_and(|note| &note.id == id)
    }

    #[must_use]
    pub const fn is_creating(&self) -> bool {
        matches!(self, Self::Creating)
    }
}
