use clap::ValueEnum;
use futures_util::TryStreamExt;
use log::{error, info};
use mongodb::bson::doc;

use bookstore::pipeline;
use bookstore::types::{AuthorBookCount, BookListing, DecadeBucket, GenrePriceSummary};
use bookstore::{filters, Book, QueryFacade};
use storage::{DBError, DBProvider, ExecutionStats, FindSpec, IndexOutcome};

const PAGE_SIZE: u32 = 5;
const UNKNOWN: &str = "(unknown)";

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    All,
    Crud,
    Advanced,
    Aggregation,
    Indexing,
}

impl Task {
    pub fn label(&self) -> &'static str {
        match self {
            Task::All => "all tasks",
            Task::Crud => "basic CRUD operations",
            Task::Advanced => "advanced queries",
            Task::Aggregation => "aggregation pipelines",
            Task::Indexing => "indexing operations",
        }
    }

    /// The task groups to run, in order.
    pub fn expand(self) -> Vec<Task> {
        match self {
            Task::All => vec![Task::Crud, Task::Advanced, Task::Aggregation, Task::Indexing],
            task => vec![task],
        }
    }
}

/// Run each group in turn. A failing group is logged and the next one still runs.
pub async fn run<P: DBProvider>(facade: &QueryFacade<P>, task: Task) -> usize {
    let mut failed = 0;
    for task in task.expand() {
        let result = match task {
            Task::Crud => basic_crud(facade).await,
            Task::Advanced => advanced_queries(facade).await,
            Task::Aggregation => aggregation_pipelines(facade).await,
            Task::Indexing => indexing_operations(facade).await,
            Task::All => Ok(()),
        };
        if let Err(e) = result {
            error!("Error in {}: {}", task.label(), e);
            failed += 1;
        }
    }
    failed
}

fn log_books(books: &[Book]) {
    if books.is_empty() {
        info!("   No books found matching criteria");
    }
    for book in books {
        info!("   - {}", book);
    }
}

fn log_stats(result: Result<ExecutionStats, DBError>) {
    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            error!("   Error running explain: {}", e);
            return;
        }
    };
    info!("   - Execution time: {}ms", stats.execution_time_millis);
    info!("   - Documents examined: {}", stats.total_docs_examined);
    info!("   - Documents returned: {}", stats.total_docs_returned);
    if let Some(stage) = &stats.winning_stage {
        info!("   - Winning stage: {}", stage);
    }
}

// Index builds and explains are logged one by one so a failure does not end the group
fn log_index_outcome(result: Result<IndexOutcome, DBError>) -> bool {
    match result {
        Ok(outcome) => {
            info!("   {}", outcome);
            true
        }
        Err(e) => {
            error!("   Error creating index: {}", e);
            false
        }
    }
}

pub async fn basic_crud<P: DBProvider>(facade: &QueryFacade<P>) -> Result<(), DBError> {
    info!("=== BASIC CRUD OPERATIONS ===");

    info!("1. Finding all Fiction books:");
    log_books(&facade.find_books(&filters::by_genre("Fiction"), FindSpec::new()).await?);

    info!("2. Finding books published after 1950:");
    log_books(&facade.find_books(&filters::published_after(1950), FindSpec::new()).await?);

    info!("3. Finding books by George Orwell:");
    for book in facade.find_books(&filters::by_author("George Orwell"), FindSpec::new()).await? {
        info!("   - \"{}\" ({}) - ${:.2}", book.title, book.published_year, book.price);
    }

    info!("4. Updating price of \"The Great Gatsby\":");
    let modified = facade.update_one_price("The Great Gatsby", 15.99).await?;
    info!("   Updated {} document(s)", modified);
    match facade.find_one_by_title("The Great Gatsby").await? {
        Some(book) => info!("   New price: ${:.2}", book.price),
        None => info!("   \"The Great Gatsby\" is not in the collection"),
    }

    info!("5. Deleting \"Moby Dick\":");
    let deleted = facade.delete_one_by_title("Moby Dick").await?;
    info!("   Deleted {} document(s)", deleted);

    Ok(())
}

pub async fn advanced_queries<P: DBProvider>(facade: &QueryFacade<P>) -> Result<(), DBError> {
    info!("=== ADVANCED QUERIES ===");

    info!("1. Books in stock AND published after 2010:");
    log_books(&facade.find_books(&filters::in_stock_published_after(2010), FindSpec::new()).await?);

    info!("2. Books with projection (title, author, price only):");
    let projection = doc! { "title": 1, "author": 1, "price": 1, "_id": 0 };
    let listings: Vec<BookListing> = facade
        .find_as(&filters::all(), FindSpec::new().projection(projection).limit(PAGE_SIZE as i64))
        .await?
        .try_collect()
        .await?;
    for listing in listings {
        info!("   - \"{}\" by {} - ${:.2}", listing.title, listing.author, listing.price);
    }

    for (label, direction) in [("ascending", 1), ("descending", -1)] {
        info!("3. Books sorted by price ({}):", label);
        let spec = FindSpec::new().sort(doc! { "price": direction }).limit(PAGE_SIZE as i64);
        for book in facade.find_books(&filters::all(), spec).await? {
            info!("   - \"{}\" - ${:.2}", book.title, book.price);
        }
    }

    for page in 0..2 {
        info!("4. Pagination - page {} ({} books per page):", page + 1, PAGE_SIZE);
        let books = facade.find_books(&filters::all(), FindSpec::page(page, PAGE_SIZE)).await?;
        for (index, book) in books.iter().enumerate() {
            info!("   {}. \"{}\" by {}", index + 1, book.title, book.author);
        }
    }

    Ok(())
}

pub async fn aggregation_pipelines<P: DBProvider>(facade: &QueryFacade<P>) -> Result<(), DBError> {
    info!("=== AGGREGATION PIPELINES ===");

    info!("1. Average price by genre:");
    let genres: Vec<GenrePriceSummary> =
        facade.aggregate(&pipeline::average_price_by_genre()).await?;
    for genre in genres {
        info!(
            "   {}: ${:.2} ({} books)",
            genre.genre.as_deref().unwrap_or(UNKNOWN),
            genre.average_price.unwrap_or_default(),
            genre.count
        );
    }

    info!("2. Author with the most books:");
    let authors: Vec<AuthorBookCount> =
        facade.aggregate(&pipeline::author_with_most_books()).await?;
    if let Some(author) = authors.first() {
        info!("   {}: {} books", author.author.as_deref().unwrap_or(UNKNOWN), author.book_count);
        info!("   Books: {}", author.books.join(", "));
    }

    info!("3. Books grouped by publication decade:");
    let decades: Vec<DecadeBucket> = facade.aggregate(&pipeline::books_by_decade()).await?;
    for decade in decades {
        info!("   {}: {} books", decade.label(), decade.count);
        for book in &decade.books {
            match book.year {
                Some(year) => info!("     - \"{}\" by {} ({})", book.title, book.author, year),
                None => info!("     - \"{}\" by {}", book.title, book.author),
            }
        }
    }

    Ok(())
}

pub async fn indexing_operations<P: DBProvider>(facade: &QueryFacade<P>) -> Result<(), DBError> {
    info!("=== INDEXING ===");

    info!("1. Creating index on title field:");
    log_index_outcome(facade.ensure_index(&doc! { "title": 1 }).await);

    info!("2. Creating compound index on author and published_year:");
    log_index_outcome(facade.ensure_index(&doc! { "author": 1, "published_year": 1 }).await);

    info!("3. Performance analysis with explain():");
    info!("   Query on genre field (no index):");
    log_stats(facade.explain(&filters::by_genre("Fiction")).await);

    info!("   Query on title field (with index):");
    log_stats(facade.explain(&filters::by_title("The Great Gatsby")).await);

    info!("   Query using compound index (author + published_year):");
    log_stats(facade.explain(&filters::by_author_published_after("George Orwell", 1940)).await);

    info!("4. Current indexes on the collection:");
    for (i, index) in facade.list_indexes().await?.iter().enumerate() {
        info!("   {}. {}: {}", i + 1, index.name, index.keys);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use bookstore::QueryFacade;
    use mockall::mock;
    use mongodb::bson::{doc, Bson, Document};
    use storage::{
        DBError, DBProvider, DocumentStream, ExecutionStats, FindSpec, IndexOutcome, IndexSummary,
        Operation,
    };

    use super::{indexing_operations, log_index_outcome, Task};

    mock! {
        pub Provider {}

        #[async_trait]
        impl DBProvider for Provider {
            async fn create(&self, item: &Document) -> Result<Bson, DBError>;
            async fn create_many(&self, items: &[Document]) -> Result<usize, DBError>;
            async fn read(&self, query: &Document) -> Result<Option<Document>, DBError>;
            async fn read_many(&self, query: &Document, spec: FindSpec) -> Result<DocumentStream, DBError>;
            async fn count(&self, query: &Document) -> Result<u64, DBError>;
            async fn update(&self, query: &Document, update: &Document) -> Result<u64, DBError>;
            async fn delete(&self, query: &Document) -> Result<u64, DBError>;
            async fn aggregate(&self, pipeline: &[Document]) -> Result<DocumentStream, DBError>;
            async fn ensure_index(&self, keys: &Document) -> Result<IndexOutcome, DBError>;
            async fn list_indexes(&self) -> Result<Vec<IndexSummary>, DBError>;
            async fn explain(&self, query: &Document) -> Result<ExecutionStats, DBError>;
            async fn close(&self) -> Result<(), DBError>;
        }
    }

    fn index_timeout() -> DBError {
        DBError::Timeout {
            operation: Operation::CreateIndex,
            collection: "books".to_string(),
            after: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn test_indexing_continues_after_failed_steps() {
        let mut provider = MockProvider::new();
        provider.expect_ensure_index().times(2).returning(|_| Err(index_timeout()));
        let mut explained = 0;
        provider.expect_explain().times(3).returning(move |_| {
            explained += 1;
            if explained == 1 {
                return Err(index_timeout());
            }
            Ok(ExecutionStats {
                execution_time_millis: 0,
                total_docs_examined: 12,
                total_docs_returned: 4,
                total_keys_examined: 0,
                winning_stage: Some("COLLSCAN".to_string()),
            })
        });
        provider.expect_list_indexes().times(1).returning(|| {
            Ok(vec![IndexSummary { name: "_id_".to_string(), keys: doc! { "_id": 1 } }])
        });

        let facade = QueryFacade::new(provider);
        assert!(indexing_operations(&facade).await.is_ok());
    }

    #[test]
    fn test_index_failure_is_logged_not_propagated() {
        assert!(!log_index_outcome(Err(index_timeout())));
        assert!(log_index_outcome(Ok(IndexOutcome::Created("title_1".to_string()))));
    }

    #[test]
    fn test_all_expands_in_tutorial_order() {
        assert_eq!(
            Task::All.expand(),
            vec![Task::Crud, Task::Advanced, Task::Aggregation, Task::Indexing]
        );
        assert_eq!(Task::Indexing.expand(), vec![Task::Indexing]);
    }
}
