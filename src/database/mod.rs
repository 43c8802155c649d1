pub mod manager;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager, FailureKind, QueryResult, SqlParam};
pub use repository::Repository;
