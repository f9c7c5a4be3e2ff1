use async_trait::async_trait;
use futures::stream::BoxStream;
use mongodb::bson::{self, Bson, Document};
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::DBError;
use crate::explain::ExecutionStats;
use crate::find_spec::FindSpec;
use crate::index::{IndexOutcome, IndexSummary};

/// Lazily pulled documents; each call that returns one opens a fresh cursor.
pub type DocumentStream = BoxStream<'static, Result<Document, DBError>>;

/// Document level operations against a single collection.
#[async_trait]
pub trait DBProvider: Send + Sync {
    /// Insert one document, returning the identifier the store assigned.
    async fn create(&self, item: &Document) -> Result<Bson, DBError>;

    /// Insert documents in order, returning how many were written.
    async fn create_many(&self, items: &[Document]) -> Result<usize, DBError>;

    async fn read(&self, query: &Document) -> Result<Option<Document>, DBError>;

    async fn read_many(&self, query: &Document, spec: FindSpec) -> Result<DocumentStream, DBError>;

    async fn count(&self, query: &Document) -> Result<u64, DBError>;

    /// `$set` the given fields on the first match, returning the modified count.
    async fn update(&self, query: &Document, update: &Document) -> Result<u64, DBError>;

    /// Delete the first match, returning the deleted count.
    async fn delete(&self, query: &Document) -> Result<u64, DBError>;

    /// Run the stages in order exactly as given.
    async fn aggregate(&self, pipeline: &[Document]) -> Result<DocumentStream, DBError>;

    async fn ensure_index(&self, keys: &Document) -> Result<IndexOutcome, DBError>;

    async fn list_indexes(&self) -> Result<Vec<IndexSummary>, DBError>;

    async fn explain(&self, query: &Document) -> Result<ExecutionStats, DBError>;

    /// Release the session. Calling it again is a no-op.
    async fn close(&self) -> Result<(), DBError>;
}

pub fn to_document<T: Serialize>(item: &T) -> Result<Document, DBError> {
    let doc = bson::to_bson(item)?
        .as_document()
        .cloned()
        .ok_or_else(|| DBError::Other("Failed to convert item to BSON document".to_string()))?;
    Ok(doc)
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, DBError> {
    let item = bson::from_bson(Bson::Document(doc))?;
    Ok(item)
}
