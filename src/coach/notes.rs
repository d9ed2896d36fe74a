// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! In-memory note store.
//!
//! Notes live only as long as the session. The store is the single source of
//! truth for both `resources/list` and `resources/read`.

use std::sync::{Arc, PoisonError, RwLock};

use crate::error::DispatchError;

/// A single named note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Unique key.
    pub name: String,
    /// Note body.
    pub content: String,
}

/// Shared, insertion-ordered note store.
///
/// Clones share the same notes. The lock is only held for the duration of a
/// single read or write, never across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct NoteStore {
    notes: Arc<RwLock<Vec<Note>>>,
}

impl NoteStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns note names in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.read(|notes| notes.iter().map(|n| n.name.clone()).collect())
    }

    /// Returns a snapshot of all notes in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<Note> {
        self.read(<[Note]>::to_vec)
    }

    /// Returns the content stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NotFound`] if no such note exists.
    pub fn get(&self, name: &str) -> Result<String, DispatchError> {
        self.read(|notes| {
            notes
                .iter()
                .find(|n| n.name == name)
                .map(|n| n.content.clone())
        })
        .ok_or_else(|| DispatchError::NotFound(name.to_string()))
    }

    /// Stores `content` under `name`, replacing any previous content.
    ///
    /// An overwritten note keeps its original position.
    pub fn put(&self, name: impl Into<String>, content: impl Into<String>) {
        let name = name.into();
        let content = content.into();
        let mut notes = self.notes.write().unwrap_or_else(PoisonError::into_inner);
        match notes.iter_mut().find(|n| n.name == name) {
            Some(existing) => existing.content = content,
            None => notes.push(Note { name, content }),
        }
    }

    /// Number of notes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read(<[Note]>::len)
    }

    /// Whether the store holds no notes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read<T>(&self, f: impl FnOnce(&[Note]) -> T) -> T {
        let notes = self.notes.read().unwrap_or_else(PoisonError::into_inner);
        f(&notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_preserves_insertion_order() {
        let store = NoteStore::new();
        store.put("b", "2");
        store.put("a", "1");
        store.put("c", "3");
        assert_eq!(store.list(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = NoteStore::new();
        assert_eq!(
            store.get("ghost"),
            Err(DispatchError::NotFound("ghost".to_string()))
        );
    }

    #[test]
    fn test_put_overwrites_in_place() {
        let store = NoteStore::new();
        store.put("first", "one");
        store.put("second", "two");
        store.put("first", "uno");

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("first"), Ok("uno".to_string()));
        assert_eq!(store.list(), vec!["first", "second"]);
    }

    #[test]
    fn test_clones_share_state() {
        let store = NoteStore::new();
        let other = store.clone();
        other.put("shared", "yes");
        assert_eq!(store.get("shared"), Ok("yes".to_string()));
        assert!(!store.is_empty());
    }

    #[test]
    fn test_entries_snapshot_is_detached() {
        let store = NoteStore::new();
        store.put("a", "1");
        let snapshot = store.entries();
        store.put("b", "2");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.entries().len(), 2);
    }
}
