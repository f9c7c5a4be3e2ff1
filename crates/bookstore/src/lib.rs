pub use facade::{BookStream, QueryFacade, RecordStream};
pub use types::Book;

pub mod facade;
pub mod filters;
pub mod pipeline;
pub mod seed;
pub mod types;
