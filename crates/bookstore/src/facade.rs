use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use log::{debug, info};
use mongodb::bson::{doc, Bson, Document};
use serde::de::DeserializeOwned;

use config::Config;
use storage::{
    from_document, to_document, DBError, DBProvider, ExecutionStats, FindSpec, IndexOutcome,
    IndexSummary, MongoDBClient,
};

use crate::filters;
use crate::pipeline::{self, Stage};
use crate::types::Book;

pub type RecordStream<T> = BoxStream<'static, Result<T, DBError>>;
pub type BookStream = RecordStream<Book>;

/// Typed operations over the books collection.
///
/// The façade owns its session; call [`QueryFacade::close`] when done, including after a
/// failed operation.
#[derive(Debug)]
pub struct QueryFacade<P> {
    provider: P,
}

impl QueryFacade<MongoDBClient> {
    /// Open a MongoDB session for the configured database and collection.
    pub async fn connect(config: &Config) -> Result<Self, DBError> {
        let provider = MongoDBClient::from_config(config).await?;
        Ok(Self::new(provider))
    }
}

impl<P: DBProvider> QueryFacade<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn insert_book(&self, book: &Book) -> Result<Bson, DBError> {
        let doc = to_document(book)?;
        let id = self.provider.create(&doc).await?;
        debug!("Inserted {} as {}", book, id);
        Ok(id)
    }

    pub async fn insert_books(&self, books: &[Book]) -> Result<usize, DBError> {
        let docs = books.iter().map(to_document).collect::<Result<Vec<_>, _>>()?;
        self.provider.create_many(&docs).await
    }

    /// Books matching `filter`, pulled lazily. Each call runs the query again.
    pub async fn find_by_filter(&self, filter: &Document, spec: FindSpec) -> Result<BookStream, DBError> {
        self.find_as(filter, spec).await
    }

    /// Like [`QueryFacade::find_by_filter`] but decoded into any record type, which is what a
    /// projection needs.
    pub async fn find_as<T>(&self, filter: &Document, spec: FindSpec) -> Result<RecordStream<T>, DBError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let documents = self.provider.read_many(filter, spec).await?;
        Ok(documents.map(|doc| doc.and_then(from_document::<T>)).boxed())
    }

    pub async fn find_books(&self, filter: &Document, spec: FindSpec) -> Result<Vec<Book>, DBError> {
        self.find_by_filter(filter, spec).await?.try_collect().await
    }

    pub async fn find_one_by_title(&self, title: &str) -> Result<Option<Book>, DBError> {
        self.provider.read(&filters::by_title(title)).await?.map(from_document).transpose()
    }

    pub async fn count(&self, filter: &Document) -> Result<u64, DBError> {
        self.provider.count(filter).await
    }

    /// Set the price of the first book titled `title`. Zero when nothing matched.
    pub async fn update_one_price(&self, title: &str, new_price: f64) -> Result<u64, DBError> {
        let modified =
            self.provider.update(&filters::by_title(title), &doc! { "price": new_price }).await?;
        debug!("Price of \"{}\" -> {}: {} modified", title, new_price, modified);
        Ok(modified)
    }

    /// Delete the first book titled `title`. Zero when nothing matched.
    pub async fn delete_one_by_title(&self, title: &str) -> Result<u64, DBError> {
        self.provider.delete(&filters::by_title(title)).await
    }

    pub async fn aggregate<T>(&self, stages: &[Stage]) -> Result<Vec<T>, DBError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let pipeline = pipeline::render(stages);
        self.provider
            .aggregate(&pipeline)
            .await?
            .map(|doc| doc.and_then(from_document::<T>))
            .try_collect()
            .await
    }

    pub async fn ensure_index(&self, keys: &Document) -> Result<IndexOutcome, DBError> {
        let outcome = self.provider.ensure_index(keys).await?;
        info!("{}", outcome);
        Ok(outcome)
    }

    pub async fn list_indexes(&self) -> Result<Vec<IndexSummary>, DBError> {
        self.provider.list_indexes().await
    }

    pub async fn explain(&self, filter: &Document) -> Result<ExecutionStats, DBError> {
        self.provider.explain(filter).await
    }

    /// Insert `books` only when the collection holds no documents yet.
    pub async fn seed_if_empty(&self, books: &[Book]) -> Result<usize, DBError> {
        let existing = self.provider.count(&filters::all()).await?;
        if existing > 0 {
            info!("Collection already holds {} book(s), skipping sample data", existing);
            return Ok(0);
        }
        let inserted = self.insert_books(books).await?;
        info!("Inserted {} sample book(s)", inserted);
        Ok(inserted)
    }

    pub async fn close(&self) -> Result<(), DBError> {
        self.provider.close().await
    }
}
