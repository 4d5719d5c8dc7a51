use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::models::Note;

/// In-memory note storage.
#[derive(Debug, Default)]
pub struct Repository {
    notes: HashMap<Uuid, Note>,
}

/// Returns now, or just after `previous` if the clock has not moved past it.
fn advance(previous: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(previous + TimeDelta::microseconds(1))
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_note(&mut self, title: String, content: String, tags: String) -> Note {
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            title,
            content,
            tags,
            created_at: now,
            updated_at: now,
        };
        self.notes.insert(note.id, note.clone());
        note
    }

    /// Applies the non-empty fields. `updated_at` always moves forward.
    pub fn update_note(
        &mut self,
        id: Uuid,
        title: Option<String>,
        content: Option<String>,
        tags: Option<String>,
    ) -> Option<Note> {
        let note = self.notes.get_mut(&id)?;

        if let Some(title) = title.filter(|t| !t.is_empty()) {
            note.title = title;
        }
        if let Some(content) = content.filter(|c| !c.is_empty()) {
            note.content = content;
        }
        if let Some(tags) = tags.filter(|t| !t.is_empty()) {
            note.tags = tags;
        }
        note.updated_at = advance(note.updated_at);

        Some(note.clone())
    }

    pub fn delete_note(&mut self, id: Uuid) -> bool {
        self.notes.remove(&id).is_some()
    }

    pub fn get_one_note(&self, id: Uuid) -> Option<Note> {
        self.notes.get(&id).cloned()
    }

    /// One page of notes matching `search`, newest update first, plus the
    /// full match count.
    pub fn search_notes(
        &self,
        search: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> (Vec<Note>, usize) {
        let needle = search.map(str::to_lowercase).unwrap_or_default();

        let mut matching: Vec<&Note> = self
            .notes
            .values()
            .filter(|note| {
                needle.is_empty()
                    || note.title.to_lowercase().contains(&needle)
                    || note.content.to_lowercase().contains(&needle)
            })
            .collect();

        matching.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        let total = matching.len();
        let page = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        (page, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Repository {
        let mut repo = Repository::new();
        repo.create_note("Groceries".into(), "shopping list: milk".into(), String::new());
        repo.create_note("Standup".into(), "talk about Shopping cart bug".into(), "work".into());
        repo.create_note("Ideas".into(), "write more rust".into(), String::new());
        repo
    }

    #[test]
    fn search_matches_title_or_content_ignoring_case() {
        let repo = seeded();

        let (notes, total) = repo.search_notes(Some("shopping"), 0, 10);
        assert_eq!(total, 2);
        assert_eq!(notes.len(), 2);

        let (notes, total) = repo.search_notes(Some("IDEAS"), 0, 10);
        assert_eq!(total, 1);
        assert_eq!(notes[0].title, "Ideas");
    }

    #[test]
    fn total_counts_all_pages() {
        let repo = seeded();
        let (notes, total) = repo.search_notes(None, 2, 2);
        assert_eq!(total, 3);
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn most_recently_updated_comes_first() {
        let mut repo = seeded();
        let (notes, _) = repo.search_notes(None, 0, 10);
        let oldest = notes.last().unwrap().id;

        repo.update_note(oldest, Some("Bumped".into()), None, None);

        let (notes, _) = repo.search_notes(None, 0, 10);
        assert_eq!(notes[0].id, oldest);
        assert_eq!(notes[0].title, "Bumped");
    }

    #[test]
    fn update_ignores_empty_fields_and_advances_timestamp() {
        let mut repo = Repository::new();
        let note = repo.create_note("t".into(), "c".into(), "a".into());

        let first = repo
            .update_note(note.id, Some(String::new()), Some("c2".into()), Some(String::new()))
            .unwrap();
        assert_eq!(first.title, "t");
        assert_eq!(first.content, "c2");
        assert_eq!(first.tags, "a");
        assert!(first.updated_at > first.created_at);

        let second = repo.update_note(note.id, None, None, None).unwrap();
        assert!(second.updated_at > first.updated_at);
    }

    #[test]
    fn delete_reports_whether_anything_was_removed() {
        let mut repo = Repository::new();
        let note = repo.create_note("t".into(), "c".into(), String::new());
        assert!(repo.delete_note(note.id));
        assert!(!repo.delete_note(note.id));
        assert!(repo.get_one_note(note.id).is_none());
    }
}
