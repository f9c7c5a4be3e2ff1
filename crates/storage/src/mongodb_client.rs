use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use derive_more::Display;
use futures::stream::{self, Stream};
use futures::{StreamExt, TryStreamExt};
use log::{debug, info, warn};
use mongodb::{
    bson::{doc, Bson, Document},
    options::{ClientOptions, FindOptions},
    Client, Collection, Database, IndexModel,
};
use tokio::time::timeout;

use config::Config;

use crate::errors::{command_error_code, is_index_conflict, DBError, Operation};
use crate::explain::ExecutionStats;
use crate::find_spec::FindSpec;
use crate::index::{default_index_name, same_key_pattern, IndexOutcome, IndexSummary};
use crate::{DBProvider, DocumentStream};

const APP_NAME: &str = "bookstore";
// Server code for a collection that does not exist yet
const NAMESPACE_NOT_FOUND: i32 = 26;

#[derive(Debug, Display, Clone)]
#[display(
    "MongoDBClient {{ db_name: {}, collection_name: {}, operation_timeout: {:?} }}",
    db_name,
    collection_name,
    operation_timeout
)]
pub struct MongoDBClient {
    client: Client,
    db_name: String,
    collection_name: String,
    operation_timeout: Duration,
    closed: Arc<AtomicBool>,
}

impl MongoDBClient {
    /// Open a session and make sure the deployment answers a `ping`.
    pub async fn new(
        mongodb_uri: &str,
        db_name: String,
        collection_name: String,
        operation_timeout: Duration,
    ) -> Result<Self, DBError> {
        // Server selection already gives up after `operation_timeout`, the outer bound only
        // catches a stalled handshake.
        let connect_bound = operation_timeout * 2;

        let mut options = bounded(
            Operation::Connect,
            &collection_name,
            connect_bound,
            ClientOptions::parse(mongodb_uri),
        )
        .await?;
        options.app_name = Some(APP_NAME.to_string());
        options.server_selection_timeout = Some(operation_timeout);

        let client = Client::with_options(options)
            .map_err(|e| DBError::from_driver(Operation::Connect, &collection_name, e))?;

        bounded(
            Operation::Connect,
            &collection_name,
            connect_bound,
            client.database("admin").run_command(doc! { "ping": 1 }, None),
        )
        .await?;

        let provider = Self {
            client,
            db_name,
            collection_name,
            operation_timeout,
            closed: Arc::new(AtomicBool::new(false)),
        };
        info!("Connected: {}", provider);
        Ok(provider)
    }

    pub async fn from_config(config: &Config) -> Result<Self, DBError> {
        Self::new(
            &config.mongodb_uri,
            config.db_name.clone(),
            config.collection_name.clone(),
            config.operation_timeout,
        )
        .await
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn get_database(&self) -> Database {
        self.client.database(&self.db_name)
    }

    pub fn get_collection(&self) -> Collection<Document> {
        self.get_database().collection(&self.collection_name)
    }

    fn ensure_open(&self, operation: Operation) -> Result<(), DBError> {
        if self.is_closed() {
            return Err(DBError::Closed { operation, collection: self.collection_name.clone() });
        }
        Ok(())
    }

    async fn timed<T, F>(&self, operation: Operation, fut: F) -> Result<T, DBError>
    where
        F: Future<Output = mongodb::error::Result<T>>,
    {
        self.ensure_open(operation)?;
        bounded(operation, &self.collection_name, self.operation_timeout, fut).await
    }

    fn wrap_cursor<S>(&self, operation: Operation, cursor: S) -> DocumentStream
    where
        S: Stream<Item = mongodb::error::Result<Document>> + Send + 'static,
    {
        bounded_stream(operation, self.collection_name.clone(), self.operation_timeout, cursor)
    }
}

/// Bound every pull from `cursor` by `after`. A pull that stalls yields one `Timeout` and ends
/// the stream.
fn bounded_stream<S>(
    operation: Operation,
    collection: String,
    after: Duration,
    cursor: S,
) -> DocumentStream
where
    S: Stream<Item = mongodb::error::Result<Document>> + Send + 'static,
{
    stream::unfold(Some(cursor.boxed()), move |state| {
        let collection = collection.clone();
        async move {
            let mut cursor = state?;
            match timeout(after, cursor.next()).await {
                Ok(Some(Ok(doc))) => Some((Ok(doc), Some(cursor))),
                Ok(Some(Err(e))) => {
                    Some((Err(DBError::from_driver(operation, &collection, e)), Some(cursor)))
                }
                Ok(None) => None,
                Err(_) => {
                    warn!("{} on {} stalled for {:?} while reading results", operation, collection, after);
                    Some((Err(DBError::Timeout { operation, collection, after }), None))
                }
            }
        }
    })
    .boxed()
}

async fn bounded<T, F>(
    operation: Operation,
    collection: &str,
    after: Duration,
    fut: F,
) -> Result<T, DBError>
where
    F: Future<Output = mongodb::error::Result<T>>,
{
    match timeout(after, fut).await {
        Ok(result) => result.map_err(|e| DBError::from_driver(operation, collection, e)),
        Err(_) => {
            warn!("{} on {} exceeded {:?}", operation, collection, after);
            Err(DBError::Timeout { operation, collection: collection.to_string(), after })
        }
    }
}

#[async_trait]
impl DBProvider for MongoDBClient {
    async fn create(&self, item: &Document) -> Result<Bson, DBError> {
        let collection = self.get_collection();
        let result = self.timed(Operation::InsertOne, collection.insert_one(item, None)).await?;
        Ok(result.inserted_id)
    }

    async fn create_many(&self, items: &[Document]) -> Result<usize, DBError> {
        if items.is_empty() {
            return Ok(0);
        }
        let collection = self.get_collection();
        let result = self.timed(Operation::InsertMany, collection.insert_many(items, None)).await?;
        Ok(result.inserted_ids.len())
    }

    async fn read(&self, query: &Document) -> Result<Option<Document>, DBError> {
        let collection = self.get_collection();
        self.timed(Operation::FindOne, collection.find_one(query.clone(), None)).await
    }

    async fn read_many(&self, query: &Document, spec: FindSpec) -> Result<DocumentStream, DBError> {
        debug!("find {} with {:?}", query, spec);
        let collection = self.get_collection();
        let cursor = self
            .timed(Operation::Find, collection.find(query.clone(), FindOptions::from(spec)))
            .await?;
        Ok(self.wrap_cursor(Operation::Find, cursor))
    }

    async fn count(&self, query: &Document) -> Result<u64, DBError> {
        let collection = self.get_collection();
        self.timed(Operation::Count, collection.count_documents(query.clone(), None)).await
    }

    async fn update(&self, query: &Document, update: &Document) -> Result<u64, DBError> {
        let collection = self.get_collection();
        let update_doc = doc! { "$set": update.clone() };
        let result = self
            .timed(Operation::UpdateOne, collection.update_one(query.clone(), update_doc, None))
            .await?;
        Ok(result.modified_count)
    }

    async fn delete(&self, query: &Document) -> Result<u64, DBError> {
        let collection = self.get_collection();
        let result =
            self.timed(Operation::DeleteOne, collection.delete_one(query.clone(), None)).await?;
        Ok(result.deleted_count)
    }

    async fn aggregate(&self, pipeline: &[Document]) -> Result<DocumentStream, DBError> {
        debug!("aggregate with {} stage(s)", pipeline.len());
        let collection = self.get_collection();
        let cursor = self
            .timed(Operation::Aggregate, collection.aggregate(pipeline.to_vec(), None))
            .await?;
        Ok(self.wrap_cursor(Operation::Aggregate, cursor))
    }

    async fn ensure_index(&self, keys: &Document) -> Result<IndexOutcome, DBError> {
        // Re-creating an identical index is a silent no-op on the server, so look first.
        if let Some(existing) =
            self.list_indexes().await?.into_iter().find(|index| same_key_pattern(&index.keys, keys))
        {
            return Ok(IndexOutcome::AlreadyExists(existing.name));
        }

        let collection = self.get_collection();
        let model = IndexModel::builder().keys(keys.clone()).build();

        self.ensure_open(Operation::CreateIndex)?;
        match timeout(self.operation_timeout, collection.create_index(model, None)).await {
            Ok(Ok(result)) => Ok(IndexOutcome::Created(result.index_name)),
            Ok(Err(e)) => match command_error_code(&e) {
                Some(code) if is_index_conflict(code) => {
                    debug!("createIndex {} conflicted with code {}", keys, code);
                    Ok(IndexOutcome::AlreadyExists(default_index_name(keys)))
                }
                _ => Err(DBError::from_driver(Operation::CreateIndex, &self.collection_name, e)),
            },
            Err(_) => Err(DBError::Timeout {
                operation: Operation::CreateIndex,
                collection: self.collection_name.clone(),
                after: self.operation_timeout,
            }),
        }
    }

    async fn list_indexes(&self) -> Result<Vec<IndexSummary>, DBError> {
        self.ensure_open(Operation::ListIndexes)?;
        let collection = self.get_collection();
        let listing = async {
            let cursor = collection.list_indexes(None).await?;
            cursor.try_collect::<Vec<IndexModel>>().await
        };

        match timeout(self.operation_timeout, listing).await {
            Ok(Ok(models)) => Ok(models.into_iter().map(IndexSummary::from).collect()),
            Ok(Err(e)) if command_error_code(&e) == Some(NAMESPACE_NOT_FOUND) => Ok(Vec::new()),
            Ok(Err(e)) => Err(DBError::from_driver(Operation::ListIndexes, &self.collection_name, e)),
            Err(_) => Err(DBError::Timeout {
                operation: Operation::ListIndexes,
                collection: self.collection_name.clone(),
                after: self.operation_timeout,
            }),
        }
    }

    async fn explain(&self, query: &Document) -> Result<ExecutionStats, DBError> {
        let command = doc! {
            "explain": { "find": self.collection_name.as_str(), "filter": query.clone() },
            "verbosity": "executionStats",
        };
        let explain =
            self.timed(Operation::Explain, self.get_database().run_command(command, None)).await?;
        ExecutionStats::from_explain(&explain)
    }

    async fn close(&self) -> Result<(), DBError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            debug!("{} already closed", self);
            return Ok(());
        }

        let client = self.client.clone();
        bounded(Operation::Close, &self.collection_name, self.operation_timeout, async move {
            client.shutdown().await;
            Ok::<(), mongodb::error::Error>(())
        })
        .await?;
        info!("MongoDB connection closed");
        Ok(())
    }
}
