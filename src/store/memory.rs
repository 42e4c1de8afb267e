use anyhow::{bail, Result};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

use crate::model::{generate_id, Document, Query, Update};
use crate::store::traits::DocumentStore;

/// Process-local document store, used for tests and single-node setups
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in a collection
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

fn field<'a>(document: &'a Document, name: &str) -> Option<&'a Value> {
    document.get(name).filter(|v| !v.is_null())
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryStore {
    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Document>> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|d| query.matches(d))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: &str, query: &Query) -> Result<Option<Document>> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.iter().find(|d| query.matches(d)).cloned()))
    }

    async fn insert(&self, collection: &str, mut document: Document) -> Result<Document> {
        if field(&document, "_id").is_none() {
            document.insert("_id".to_string(), Value::String(generate_id()));
        }

        let mut collections = self.collections.write();
        let documents = collections.entry(collection.to_string()).or_default();

        for unique in ["_id", "shortid"] {
            if let Some(value) = field(&document, unique) {
                if documents.iter().any(|d| field(d, unique) == Some(value)) {
                    bail!(
                        "Duplicate {} {} in collection '{}'",
                        unique,
                        value,
                        collection
                    );
                }
            }
        }

        documents.push(document.clone());
        Ok(document)
    }

    async fn update(&self, collection: &str, query: &Query, update: &Update) -> Result<u64> {
        let mut collections = self.collections.write();
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let mut matched = 0;
        for document in documents.iter_mut().filter(|d| query.matches(d)) {
            update.apply(document);
            matched += 1;
        }
        Ok(matched)
    }

    async fn remove(&self, collection: &str, query: &Query) -> Result<u64> {
        let mut collections = self.collections.write();
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let before = documents.len();
        documents.retain(|d| !query.matches(d));
        Ok((before - documents.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let store = InMemoryStore::new();
        let inserted = store
            .insert("templates", doc(json!({"name": "a"})))
            .await
            .unwrap();

        assert!(inserted.get("_id").and_then(Value::as_str).is_some());
        assert_eq!(store.count("templates"), 1);
    }

    #[tokio::test]
    async fn test_duplicate_shortid_rejected() {
        let store = InMemoryStore::new();
        store
            .insert("templates", doc(json!({"shortid": "abc"})))
            .await
            .unwrap();

        let second = store.insert("templates", doc(json!({"shortid": "abc"}))).await;
        assert!(second.is_err());

        // Other collections are separate namespaces
        store
            .insert("folders", doc(json!({"shortid": "abc"})))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let store = InMemoryStore::new();
        for name in ["a", "b", "a"] {
            store
                .insert("templates", doc(json!({"name": name})))
                .await
                .unwrap();
        }

        let mut set = Document::new();
        set.insert("content".to_string(), json!("x"));
        let matched = store
            .update("templates", &Query::new().eq("name", "a"), &Update::set(set))
            .await
            .unwrap();
        assert_eq!(matched, 2);

        let updated = store
            .find("templates", &Query::new().eq("content", "x"))
            .await
            .unwrap();
        assert_eq!(updated.len(), 2);

        let removed = store
            .remove("templates", &Query::new().eq("name", "a"))
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.count("templates"), 1);
    }

    #[tokio::test]
    async fn test_find_one_on_unknown_collection() {
        let store = InMemoryStore::new();
        let found = store.find_one("folders", &Query::new()).await.unwrap();
        assert!(found.is_none());
    }
}
