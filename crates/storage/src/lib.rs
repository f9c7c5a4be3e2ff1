pub use db_provider::{from_document, to_document, DBProvider, DocumentStream};
pub use errors::{DBError, Operation};
pub use explain::ExecutionStats;
pub use find_spec::FindSpec;
pub use index::{IndexOutcome, IndexSummary};
pub use mongodb_client::MongoDBClient;

pub mod db_provider;
pub mod errors;
pub mod explain;
pub mod find_spec;
pub mod index;
pub mod mongodb_client;
