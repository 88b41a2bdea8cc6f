//! Browsing history.

use crate::url_list::UrlList;

/// History of visited URLs for the session.
///
/// Entries are unique by exact URL string and listed in first-visit order.
#[derive(Clone, Debug, Default)]
pub struct HistoryStore {
    entries: UrlList,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visit. Returns true if the URL was not in history yet.
    pub fn add_visit(&mut self, url: &str) -> bool {
        self.entries.insert(url)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Case-insensitive substring search over history URLs.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();
        self.entries
            .as_slice()
            .iter()
            .filter(|url| url.to_lowercase().contains(&query))
            .map(String::as_str)
            .collect()
    }

    pub fn entries(&self) -> &[String] {
        self.entries.as_slice()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_twice_stores_once() {
        let mut history = HistoryStore::new();

        assert!(history.add_visit("https://example.com"));
        assert!(!history.add_visit("https://example.com"));

        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_insertion_order() {
        let mut history = HistoryStore::new();
        history.add_visit("https://b.test");
        history.add_visit("https://a.test");
        history.add_visit("https://b.test");

        assert_eq!(history.entries(), ["https://b.test", "https://a.test"]);
    }

    #[test]
    fn test_search_and_clear() {
        let mut history = HistoryStore::new();
        history.add_visit("https://Docs.rs/tokio");
        history.add_visit("https://example.com");

        assert_eq!(history.search("docs"), vec!["https://Docs.rs/tokio"]);

        history.clear();
        assert!(history.is_empty());
        assert!(history.add_visit("https://example.com"));
    }
}
