use crate::model::{Document, Query, Update};
use anyhow::Result;

/// Flat document store with named collections.
///
/// Implementations assign `_id` on insert when the document has none and
/// reject a second document with the same `shortid` in a collection.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents matching the query, in insertion order
    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Document>>;
    /// First document matching the query
    async fn find_one(&self, collection: &str, query: &Query) -> Result<Option<Document>>;
    /// Store a new document and return it as persisted
    async fn insert(&self, collection: &str, document: Document) -> Result<Document>;
    /// Apply a `$set` update to every matching document, returning the match count
    async fn update(&self, collection: &str, query: &Query, update: &Update) -> Result<u64>;
    /// Delete every matching document, returning the removed count
    async fn remove(&self, collection: &str, query: &Query) -> Result<u64>;
}

