//! Storage keys and the in-memory store
//!
//! The engine persists through any [`crate::KeyValueStore`]; this module
//! holds the key names shared by every backend and an in-memory store for
//! tests, tooling, and platforms without durable storage.
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError};

use crate::KeyValueStore;

/// Board cells, 9-element JSON array.
pub const KEY_SQUARES: &str = "squares";
/// Turn flag, JSON boolean.
pub const KEY_X_IS_NEXT: &str = "xIsNext";
/// Score tallies, `{"X", "O", "Draws"}` object.
pub const KEY_SCORES: &str = "scores";
/// Human display name, JSON string.
pub const KEY_PLAYER_ONE_NAME: &str = "player1Name";
/// Opponent display name, JSON string.
pub const KEY_PLAYER_TWO_NAME: &str = "player2Name";
/// Opponent strength token.
pub const KEY_DIFFICULTY: &str = "difficulty";

/// Shared in-memory key-value store. Clones see the same map, which lets a
/// test drop an engine and rebuild it over the surviving store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw stored value, mostly useful to tests asserting on shapes.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Seed a raw value, bypassing the engine.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.insert_raw(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);

        store.set(KEY_X_IS_NEXT, "true").unwrap();
        assert_eq!(store.get(KEY_X_IS_NEXT).unwrap().as_deref(), Some("true"));
        assert_eq!(store.len(), 1);

        store.remove(KEY_X_IS_NEXT).unwrap();
        assert_eq!(store.get(KEY_X_IS_NEXT).unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn clones_share_the_same_entries() {
        let store = MemoryStore::new();
        let alias = store.clone();
        store.set(KEY_SCORES, r#"{"X":1,"O":0,"Draws":0}"#).unwrap();
        assert_eq!(
            alias.raw(KEY_SCORES).as_deref(),
            Some(r#"{"X":1,"O":0,"Draws":0}"#)
        );
    }
}
