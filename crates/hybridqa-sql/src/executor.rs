use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use hybridqa_core::error::{Error, QueryError};
use hybridqa_core::safety::check_read_only;
use hybridqa_core::traits::QueryExecutor;
use hybridqa_core::types::NO_RESULTS;

use crate::render::{display_cell, markdown_table};
use crate::tables::{cite_tables, ALLOWED_TABLES};

/// Executes generated SQL against a SQLite file.
///
/// Holds only the path: every call opens its own read-only connection, so a
/// shared executor never serializes concurrent questions on one handle.
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    db_path: PathBuf,
}

impl SqliteExecutor {
    pub fn open(db_path: impl Into<PathBuf>) -> hybridqa_core::error::Result<Self> {
        let db_path = db_path.into();
        if !db_path.is_file() {
            return Err(Error::NotFound(format!("database {}", db_path.display())));
        }
        Ok(Self { db_path })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }

    /// `Table: <name>\nColumns: <a>, <b>\n\n` for each allow-listed table.
    pub fn schema_string(&self) -> anyhow::Result<String> {
        let conn = self.connect()?;
        let mut schema = String::new();
        for table in ALLOWED_TABLES {
            let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table.name))?;
            let columns = stmt
                .query_map([], |row| row.get::<_, String>(1))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            schema.push_str(&format!("Table: {}\nColumns: {}\n\n", table.name, columns.join(", ")));
        }
        Ok(schema)
    }

    pub fn run(&self, sql: &str) -> Result<String, QueryError> {
        check_read_only(sql)?;
        if sql.trim().is_empty() {
            return Err(QueryError::Execution("empty query".to_string()));
        }
        self.run_unchecked(sql).map_err(|e| QueryError::Execution(e.to_string()))
    }

    fn run_unchecked(&self, sql: &str) -> rusqlite::Result<String> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql)?;

        // capture metadata BEFORE starting rows() to avoid borrow conflicts
        let col_count = stmt.column_count();
        let col_names: Vec<String> = (0..col_count)
            .map(|i| stmt.column_name(i).unwrap_or("?").to_string())
            .collect();

        let mut rows = stmt.query([])?;
        let mut rendered = Vec::new();
        while let Some(row) = rows.next()? {
            rendered.push((0..col_count).map(|i| display_cell(row, i)).collect::<Vec<_>>());
        }
        debug!(rows = rendered.len(), "query executed");
        if rendered.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }
        Ok(markdown_table(&col_names, &rendered))
    }
}

impl QueryExecutor for SqliteExecutor {
    fn schema(&self) -> anyhow::Result<String> { self.schema_string() }

    fn execute(&self, sql: &str) -> Result<String, QueryError> { self.run(sql) }

    fn cite_tables(&self, sql: &str) -> Vec<String> { cite_tables(sql) }
}
