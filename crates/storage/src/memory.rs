use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::StorageError;
use crate::traits::{Backstory, BackstoryStore};

/// Insertion-ordered in-memory store keyed by backstory key, with a secondary
/// identifier index.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: IndexMap<String, Backstory>,
    by_identifier: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl BackstoryStore for MemoryStore {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn entries(&self) -> impl Iterator<Item = (&str, &Backstory)> {
        self.entries.iter().map(|(key, story)| (key.as_str(), story))
    }

    fn get(&self, key: &str) -> Option<&Backstory> {
        self.entries.get(key)
    }

    fn get_by_identifier(&self, identifier: &str) -> Result<Option<Backstory>, StorageError> {
        Ok(self
            .by_identifier
            .get(identifier)
            .and_then(|key| self.entries.get(key))
            .cloned())
    }

    fn upsert(&mut self, key: &str, backstory: Backstory) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::ConstraintViolation(format!(
                "empty key for backstory {}",
                backstory.identifier
            )));
        }

        let identifier = backstory.identifier.clone();
        // Replacing under the same key keeps its position in iteration order.
        let previous = self.entries.insert(key.to_string(), backstory);
        self.by_identifier.insert(identifier.clone(), key.to_string());

        if let Some(previous) = previous
            && previous.identifier != identifier
            && self.by_identifier.get(&previous.identifier).map(String::as_str) == Some(key)
        {
            // Another entry may still carry the old identifier.
            let other = self
                .entries
                .iter()
                .find(|(_, story)| story.identifier == previous.identifier)
                .map(|(other, _)| other.clone());
            match other {
                Some(other) => {
                    self.by_identifier.insert(previous.identifier, other);
                }
                None => {
                    self.by_identifier.remove(&previous.identifier);
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, Backstory)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (String, Backstory)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (key, backstory) in iter {
            store.by_identifier.insert(backstory.identifier.clone(), key.clone());
            store.entries.insert(key, backstory);
        }
        store
    }
}
