//! Bookmarks management.

use crate::url_list::UrlList;

/// Outcome of adding a bookmark.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookmarkOutcome {
    Added,
    AlreadyExists,
}

/// Bookmarked URLs, unique by exact string, in the order they were added.
#[derive(Clone, Debug, Default)]
pub struct BookmarkStore {
    bookmarks: UrlList,
}

impl BookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, url: &str) -> BookmarkOutcome {
        if self.bookmarks.insert(url) {
            BookmarkOutcome::Added
        } else {
            BookmarkOutcome::AlreadyExists
        }
    }

    pub fn bookmarks(&self) -> &[String] {
        self.bookmarks.as_slice()
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }
}
