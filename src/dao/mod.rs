/// Best-effort flat-file mirror of accepted submissions.
pub mod files;
/// Database model definitions.
pub mod models;
/// SQLite store implementations.
pub mod sqlite;
/// Storage abstraction layer for database operations.
pub mod storage;
/// Submission and result store traits.
pub mod store;
