//! History stack with browser semantics.

use marginalia_core::navigation::{HistoryBackend, HistoryEntry};

/// A back/forward stack that behaves like `window.history`.
///
/// Starts with a single entry without payload, the page as it was loaded.
#[derive(Debug, Clone)]
pub struct InMemoryHistory {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::with_initial_query("")
    }
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts at a URL that already carries a query, as after a reload.
    pub fn with_initial_query(query: impl Into<String>) -> Self {
        Self {
            entries: vec![HistoryEntry {
                payload: None,
                query: query.into(),
            }],
            cursor: 0,
        }
    }

    /// Moves back one entry and returns it, like a `popstate` event.
    pub fn back(&mut self) -> Option<HistoryEntry> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].clone())
    }

    /// Moves forward one entry and returns it.
    pub fn forward(&mut self) -> Option<HistoryEntry> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor].clone())
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.cursor]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HistoryBackend for InMemoryHistory {
    fn push(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;
    }

    fn replace(&mut self, entry: HistoryEntry) {
        self.entries[self.cursor] = entry;
    }

    fn current_query(&self) -> String {
        self.current().query.clone()
    }
}
