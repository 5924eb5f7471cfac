//! # In-Memory Repository
//!
//! Same contract as the SQLite repository, kept in a `Vec` so insertion
//! order doubles as creation order. Used by tests and local tooling.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{validate_field, Repository};
use crate::document::Document;
use crate::error::{DbError, DbResult};

/// In-process document collection.
#[derive(Debug)]
pub struct MemoryRepository<T> {
    docs: RwLock<Vec<(String, T)>>,
}

impl<T> MemoryRepository<T> {
    pub fn new() -> Self {
        MemoryRepository {
            docs: RwLock::new(Vec::new()),
        }
    }
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Document> Repository<T> for MemoryRepository<T> {
    async fn create(&self, doc: &T) -> DbResult<()> {
        let id = doc.document_id();
        let mut docs = self.docs.write().await;
        if docs.iter().any(|(key, _)| *key == id) {
            return Err(DbError::duplicate(T::COLLECTION, id));
        }
        docs.push((id, doc.clone()));
        Ok(())
    }

    async fn read_all(&self) -> DbResult<Vec<T>> {
        let docs = self.docs.read().await;
        Ok(docs.iter().map(|(_, doc)| doc.clone()).collect())
    }

    async fn find_by_id(&self, id: &str) -> DbResult<Option<T>> {
        let docs = self.docs.read().await;
        Ok(docs
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, doc)| doc.clone()))
    }

    async fn find_by_field(&self, field: &str, value: &Value) -> DbResult<Vec<T>> {
        validate_field(field)?;

        let docs = self.docs.read().await;
        let mut matches = Vec::new();
        for (_, doc) in docs.iter() {
            let json = serde_json::to_value(doc)?;
            let actual = json.get(field).unwrap_or(&Value::Null);
            if actual == value {
                matches.push(doc.clone());
            }
        }
        Ok(matches)
    }

    async fn update_by_id(&self, id: &str, doc: &T) -> DbResult<()> {
        let mut docs = self.docs.write().await;
        match docs.iter_mut().find(|(key, _)| key == id) {
            Some((_, slot)) => {
                *slot = doc.clone();
                Ok(())
            }
            None => Err(DbError::not_found(T::COLLECTION, id)),
        }
    }

    async fn replace_if_unchanged(&self, id: &str, current: &T, doc: &T) -> DbResult<()> {
        let expected = serde_json::to_value(current)?;
        let mut docs = self.docs.write().await;
        let (_, slot) = docs
            .iter_mut()
            .find(|(key, _)| key == id)
            .ok_or_else(|| DbError::not_found(T::COLLECTION, id))?;

        if serde_json::to_value(&*slot)? != expected {
            return Err(DbError::stale(T::COLLECTION, id));
        }
        *slot = doc.clone();
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> DbResult<()> {
        let mut docs = self.docs.write().await;
        let before = docs.len();
        docs.retain(|(key, _)| key != id);
        if docs.len() == before {
            return Err(DbError::not_found(T::COLLECTION, id));
        }
        Ok(())
    }

    async fn count(&self) -> DbResult<u64> {
        Ok(self.docs.read().await.len() as u64)
    }

    async fn exists(&self, id: &str) -> bool {
        self.docs.read().await.iter().any(|(key, _)| key == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::contract;
    use tableside_core::{Manager, OrderSession, Seat};

    #[tokio::test]
    async fn test_create_and_find() {
        contract::create_and_find(&MemoryRepository::<OrderSession>::new()).await;
    }

    #[tokio::test]
    async fn test_read_all_and_count() {
        contract::read_all_and_count(&MemoryRepository::<OrderSession>::new()).await;
    }

    #[tokio::test]
    async fn test_find_by_field() {
        contract::find_by_field(&MemoryRepository::<OrderSession>::new()).await;
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        contract::update_and_delete(&MemoryRepository::<OrderSession>::new()).await;
    }

    #[tokio::test]
    async fn test_stale_write_rejected() {
        contract::stale_write_rejected(&MemoryRepository::<OrderSession>::new()).await;
    }

    #[tokio::test]
    async fn test_seat_by_name() {
        contract::seat_by_name(&MemoryRepository::<Seat>::new()).await;
    }

    #[tokio::test]
    async fn test_bool_field() {
        contract::bool_field(&MemoryRepository::<Manager>::new()).await;
    }
}
