//! In-memory browser history.

use super::lock;
use crate::query::Location;
use std::sync::Mutex;

/// History stack of search strings. The last entry is the current URL.
#[derive(Debug)]
pub struct MemoryLocation {
    history: Mutex<Vec<String>>,
}

impl MemoryLocation {
    /// History with one entry; a leading `?` is dropped.
    #[must_use]
    pub fn new(search: &str) -> Self {
        Self {
            history: Mutex::new(vec![normalize(search)]),
        }
    }

    /// Go back one entry. Returns false at the first entry.
    pub fn back(&self) -> bool {
        let mut history = lock(&self.history);
        if history.len() > 1 {
            history.pop();
            true
        } else {
            false
        }
    }

    /// Every entry, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        lock(&self.history).clone()
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("")
    }
}

impl Location for MemoryLocation {
    fn search(&self) -> String {
        lock(&self.history).last().cloned().unwrap_or_default()
    }

    fn push(&self, search: &str) {
        lock(&self.history).push(normalize(search));
    }
}

fn normalize(search: &str) -> String {
    search.strip_prefix('?').unwrap_or(search).to_string()
}
