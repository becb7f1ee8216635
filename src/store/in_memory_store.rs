use std::collections::{HashMap, hash_map::Entry};

use crate::identifier::{StorageUnavailable, UniquenessOracle};

use super::{Record, RecordStore, StoreError};

#[derive(Debug)]
pub struct InMemoryStore<T> {
    records: HashMap<String, Record<T>>,
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
        }
    }
}

impl<T> InMemoryStore<T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T> UniquenessOracle for InMemoryStore<T> {
    fn exists(&self, identifier: &str) -> Result<bool, StorageUnavailable> {
        Ok(self.records.contains_key(identifier))
    }
}

impl<T> RecordStore<T> for InMemoryStore<T> {
    fn insert(&mut self, record: Record<T>) -> Result<(), StoreError> {
        match self.records.entry(record.uuid.clone()) {
            Entry::Occupied(entry) => Err(StoreError::DuplicateIdentifier {
                uuid: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(record);
                Ok(())
            }
        }
    }

    fn get(&self, uuid: &str) -> Option<&Record<T>> {
        self.records.get(uuid)
    }

    fn get_mut(&mut self, uuid: &str) -> Option<&mut Record<T>> {
        self.records.get_mut(uuid)
    }

    fn records<'a>(&'a self) -> impl Iterator<Item = &'a Record<T>>
    where
        T: 'a,
    {
        self.records.values()
    }
}
