//! Per-page notes.

use common::{ShellError, ShellResult};

/// A note attached to a page URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Note {
    pub url: String,
    pub text: String,
}

/// Append-only note list. Notes for the same URL accumulate independently.
#[derive(Clone, Debug, Default)]
pub struct NoteStore {
    notes: Vec<Note>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a note. Empty text is rejected.
    pub fn add(&mut self, url: &str, text: &str) -> ShellResult<&Note> {
        if text.is_empty() {
            return Err(ShellError::user_input("note text is empty"));
        }

        self.notes.push(Note {
            url: url.to_string(),
            text: text.to_string(),
        });
        Ok(&self.notes[self.notes.len() - 1])
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Text shown in the notes sidebar.
    pub fn render_sidebar(&self) -> String {
        self.notes
            .iter()
            .map(|n| format!("Note for {}:\n{}\n", n.url, n.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ErrorKind;

    #[test]
    fn test_notes_accumulate() {
        let mut store = NoteStore::new();
        store.add("https://a.test", "first").unwrap();
        store.add("https://a.test", "first").unwrap();
        store.add("https://b.test", "other").unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.notes().iter().filter(|n| n.url == "https://a.test").count(), 2);
    }

    #[test]
    fn test_empty_note_rejected() {
        let mut store = NoteStore::new();
        let err = store.add("https://a.test", "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UserInput);
        assert!(store.is_empty());
    }

    #[test]
    fn test_render_sidebar() {
        let mut store = NoteStore::new();
        store.add("https://a.test", "read later").unwrap();
        store.add("https://b.test", "cite this").unwrap();

        assert_eq!(
            store.render_sidebar(),
            "Note for https://a.test:\nread later\n\nNote for https://b.test:\ncite this\n"
        );
    }
}
