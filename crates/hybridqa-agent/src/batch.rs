//! JSONL batch runner.
//!
//! Questions run on tokio's blocking pool, `workers` at a time. Results are
//! collected in input order and every question produces exactly one line.
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use hybridqa_core::types::{FinalOutput, QuestionRecord};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::graph::Agent;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub workers: usize,
    pub question_timeout: Duration,
    pub show_progress: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { workers: 4, question_timeout: Duration::from_secs(120), show_progress: false }
    }
}

/// Parse the whole input up front. Any unreadable line aborts the batch
/// before a single question is answered.
pub fn read_questions(path: &Path) -> Result<Vec<QuestionRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading batch file {}", path.display()))?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{}:{}: invalid question record", path.display(), n + 1))
        })
        .collect()
}

pub fn write_outputs(path: &Path, outputs: &[FinalOutput]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for output in outputs {
        serde_json::to_writer(&mut out, output)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Answer one question on the blocking pool, bounded by `timeout`. Panics
/// and timeouts come back as degraded records.
pub async fn answer_one(
    agent: Arc<Agent>,
    record: QuestionRecord,
    timeout: Duration,
) -> FinalOutput {
    let id = record.id.clone();
    let task = tokio::task::spawn_blocking(move || agent.answer(&record));
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(output)) => output,
        Ok(Err(join_err)) => {
            warn!(id = %id, error = %join_err, "question task aborted");
            FinalOutput::degraded(&id, format!("question task aborted: {join_err}"))
        }
        Err(_) => {
            warn!(id = %id, ?timeout, "question timed out");
            FinalOutput::degraded(&id, format!("timed out after {timeout:?}"))
        }
    }
}

pub async fn answer_all(
    agent: Arc<Agent>,
    records: Vec<QuestionRecord>,
    options: &BatchOptions,
) -> Vec<FinalOutput> {
    let pb = progress_bar(records.len() as u64, options.show_progress);
    let timeout = options.question_timeout;
    let outputs = stream::iter(records)
        .map(|record| {
            let agent = Arc::clone(&agent);
            let pb = pb.clone();
            async move {
                let output = answer_one(agent, record, timeout).await;
                pb.inc(1);
                output
            }
        })
        .buffered(options.workers.max(1))
        .collect::<Vec<_>>()
        .await;
    pb.finish_and_clear();
    outputs
}

/// Read `input`, answer everything, write `output`.
pub fn run_batch(
    agent: Arc<Agent>,
    input: &Path,
    output: &Path,
    options: &BatchOptions,
) -> Result<usize> {
    let records = read_questions(input)?;
    info!(questions = records.len(), workers = options.workers, "starting batch");

    let rt = tokio::runtime::Runtime::new()?;
    let outputs = rt.block_on(answer_all(agent, records, options));
    // Timed-out blocking tasks cannot be cancelled; don't wait on them.
    rt.shutdown_timeout(Duration::from_secs(1));

    write_outputs(output, &outputs)?;
    info!(written = outputs.len(), path = %output.display(), "batch complete");
    Ok(outputs.len())
}

fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    let template = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] \
                    {pos}/{len} questions ({percent}%)";
    if let Ok(style) = ProgressStyle::default_bar().template(template) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
