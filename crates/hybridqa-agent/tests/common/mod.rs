#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::bail;
use hybridqa_agent::Agent;
use hybridqa_core::config::Settings;
use hybridqa_core::error::QueryError;
use hybridqa_core::traits::{Generator, QueryExecutor, TextSearch};
use hybridqa_core::types::{Fields, GenerationTask, SearchHit};
use hybridqa_sql::SqliteExecutor;
use rusqlite::Connection;

pub fn seed_db(dir: &Path) -> PathBuf {
    let path = dir.join("northwind.sqlite");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE orders (OrderID INTEGER PRIMARY KEY, CustomerID TEXT, OrderDate TEXT);
         CREATE TABLE order_items (OrderID INTEGER, ProductID INTEGER, UnitPrice REAL,
                                   Quantity INTEGER, Discount REAL);
         CREATE TABLE products (ProductID INTEGER PRIMARY KEY, ProductName TEXT,
                                CategoryID INTEGER);
         CREATE TABLE customers (CustomerID TEXT PRIMARY KEY, CompanyName TEXT);
         INSERT INTO orders VALUES (1, 'ALFKI', '1997-06-02'), (2, 'ANATR', '1997-12-05');
         INSERT INTO products VALUES (1, 'Chai', 1), (2, 'Chang', 1);
         INSERT INTO order_items VALUES (1, 1, 18.0, 10, 0.0), (2, 2, 19.0, 5, 0.0);
         INSERT INTO customers VALUES ('ALFKI', 'Alfreds Futterkiste'), ('ANATR', 'Ana Trujillo');",
    )
    .unwrap();
    path
}

pub fn order_count(db: &Path) -> i64 {
    let conn = Connection::open(db).unwrap();
    conn.query_row("SELECT COUNT(*) FROM orders", [], |r| r.get(0)).unwrap()
}

/// Replays canned outputs. Each queue yields its entries in order and then
/// keeps repeating the last one.
#[derive(Default)]
pub struct ScriptedGenerator {
    classification: String,
    sql: Mutex<VecDeque<String>>,
    answers: Mutex<VecDeque<String>>,
    plan_filters: String,
    fail: bool,
    calls: Mutex<HashMap<&'static str, usize>>,
    previous_errors: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(classification: &str) -> Self {
        Self { classification: classification.to_string(), ..Default::default() }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn sql(self, queries: &[&str]) -> Self {
        *self.sql.lock().unwrap() = queries.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn answers(self, answers: &[&str]) -> Self {
        *self.answers.lock().unwrap() = answers.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn plan_filters(mut self, filters: &str) -> Self {
        self.plan_filters = filters.to_string();
        self
    }

    pub fn calls(&self, task: &str) -> usize {
        self.calls.lock().unwrap().get(task).copied().unwrap_or(0)
    }

    pub fn previous_errors(&self) -> Vec<String> {
        self.previous_errors.lock().unwrap().clone()
    }

    fn next(queue: &Mutex<VecDeque<String>>) -> String {
        let mut q = queue.lock().unwrap();
        if q.len() > 1 {
            q.pop_front().unwrap()
        } else {
            q.front().cloned().unwrap_or_default()
        }
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&self, task: &GenerationTask<'_>) -> anyhow::Result<Fields> {
        *self.calls.lock().unwrap().entry(task.name()).or_insert(0) += 1;
        if self.fail {
            bail!("backend offline");
        }
        Ok(match *task {
            GenerationTask::Route { .. } => {
                Fields::new().with("classification", self.classification.as_str())
            }
            GenerationTask::Plan { .. } => Fields::new()
                .with("date_range", "None")
                .with("filters", self.plan_filters.as_str())
                .with("column_logic", "SUM(UnitPrice * Quantity * (1 - Discount))"),
            GenerationTask::GenerateQuery { previous_error, .. } => {
                self.previous_errors.lock().unwrap().push(previous_error.to_string());
                Fields::new().with("sql_query", Self::next(&self.sql))
            }
            GenerationTask::Synthesize { .. } => Fields::new()
                .with("final_answer", Self::next(&self.answers))
                .with("explanation", "Computed from the retrieved data."),
        })
    }
}

pub struct StubSearch {
    hits: Vec<SearchHit>,
    pub calls: AtomicUsize,
}

impl StubSearch {
    pub fn new(hits: &[(&str, &str, f32)]) -> Self {
        Self {
            hits: hits
                .iter()
                .map(|(id, content, score)| SearchHit {
                    id: id.to_string(),
                    content: content.to_string(),
                    score: *score,
                })
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl TextSearch for StubSearch {
    fn search(&self, _query: &str, k: usize) -> anyhow::Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.hits.iter().take(k).cloned().collect())
    }
}

/// Real SQLite executor that counts how often it is asked to run a query.
pub struct CountingExecutor {
    inner: SqliteExecutor,
    pub executions: AtomicUsize,
}

impl CountingExecutor {
    pub fn new(db: &Path) -> Self {
        Self { inner: SqliteExecutor::open(db).unwrap(), executions: AtomicUsize::new(0) }
    }

    pub fn count(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

impl QueryExecutor for CountingExecutor {
    fn schema(&self) -> anyhow::Result<String> {
        self.inner.schema()
    }

    fn execute(&self, sql: &str) -> Result<String, QueryError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(sql)
    }

    fn cite_tables(&self, sql: &str) -> Vec<String> {
        self.inner.cite_tables(sql)
    }
}

pub fn agent(
    search: Arc<StubSearch>,
    executor: Arc<CountingExecutor>,
    generator: Arc<ScriptedGenerator>,
) -> Agent {
    Agent::new(search, executor, generator, &Settings::default())
}
