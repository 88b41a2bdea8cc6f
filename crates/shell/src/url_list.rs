//! Insertion-ordered URL list without duplicates.

use std::collections::HashSet;

/// URLs in insertion order, deduplicated by exact string equality.
#[derive(Clone, Debug, Default)]
pub struct UrlList {
    urls: Vec<String>,
    seen: HashSet<String>,
}

impl UrlList {
    /// Append `url` unless already present. Returns true if it was added.
    pub fn insert(&mut self, url: &str) -> bool {
        if !self.seen.insert(url.to_string()) {
            return false;
        }
        self.urls.push(url.to_string());
        true
    }

    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn clear(&mut self) {
        self.urls.clear();
        self.seen.clear();
    }
}
