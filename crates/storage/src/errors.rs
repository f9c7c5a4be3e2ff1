use std::time::Duration;

use derive_more::Display;
use mongodb::bson;
use mongodb::error::ErrorKind;
use thiserror::Error;

/// Driver error codes that mean the requested index is already present, possibly under
/// another name or with other options.
pub const INDEX_CONFLICT_CODES: [i32; 3] = [
    68, // IndexAlreadyExists
    85, // IndexOptionsConflict
    86, // IndexKeySpecsConflict
];

/// The collection level operation a failure belongs to.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    #[display("connect")]
    Connect,
    #[display("insertOne")]
    InsertOne,
    #[display("insertMany")]
    InsertMany,
    #[display("findOne")]
    FindOne,
    #[display("find")]
    Find,
    #[display("countDocuments")]
    Count,
    #[display("updateOne")]
    UpdateOne,
    #[display("deleteOne")]
    DeleteOne,
    #[display("aggregate")]
    Aggregate,
    #[display("createIndex")]
    CreateIndex,
    #[display("listIndexes")]
    ListIndexes,
    #[display("explain")]
    Explain,
    #[display("close")]
    Close,
}

impl Operation {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Operation::InsertOne
                | Operation::InsertMany
                | Operation::UpdateOne
                | Operation::DeleteOne
                | Operation::CreateIndex
        )
    }
}

#[derive(Error, Debug)]
pub enum DBError {
    #[error("Connection error during {operation} on `{collection}`: {source}")]
    Connection {
        operation: Operation,
        collection: String,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("Write error during {operation} on `{collection}`: {source}")]
    Write {
        operation: Operation,
        collection: String,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("Read error during {operation} on `{collection}`: {source}")]
    Read {
        operation: Operation,
        collection: String,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("{operation} on `{collection}` timed out after {}ms", .after.as_millis())]
    Timeout { operation: Operation, collection: String, after: Duration },

    #[error("{operation} on `{collection}` issued after the session was closed")]
    Closed { operation: Operation, collection: String },

    #[error("BSON serialization error: {0}")]
    BsonSerialization(#[from] bson::ser::Error),

    #[error("BSON deserialization error: {0}")]
    BsonDeserialization(#[from] bson::de::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl DBError {
    /// Classify a driver error raised while running `operation` against `collection`.
    pub fn from_driver(
        operation: Operation,
        collection: impl Into<String>,
        source: mongodb::error::Error,
    ) -> Self {
        let collection = collection.into();
        if operation == Operation::Connect || is_connection_failure(&source) {
            DBError::Connection { operation, collection, source }
        } else if operation.is_write() {
            DBError::Write { operation, collection, source }
        } else {
            DBError::Read { operation, collection, source }
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, DBError::Timeout { .. })
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, DBError::Connection { .. })
    }
}

fn is_connection_failure(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::ServerSelection { .. }
            | ErrorKind::Authentication { .. }
            | ErrorKind::Io(_)
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::ConnectionPoolCleared { .. }
    )
}

/// The server error code carried by a failed command, if any.
pub fn command_error_code(err: &mongodb::error::Error) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Command(command_error) => Some(command_error.code),
        _ => None,
    }
}

pub fn is_index_conflict(code: i32) -> bool {
    INDEX_CONFLICT_CODES.contains(&code)
}
