//! hybridqa-sql
//!
//! Read-only SQLite access for generated queries: a compact schema listing
//! for the allow-listed tables, guarded execution with Markdown-rendered
//! rows, and table-name citation inference.
pub mod executor;
pub mod render;
pub mod tables;

pub use executor::SqliteExecutor;
pub use tables::{cite_tables, ALLOWED_TABLES};
