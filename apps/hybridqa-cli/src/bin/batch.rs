use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use hybridqa_agent::batch::{run_batch, BatchOptions};
use hybridqa_agent::ollama::{OllamaConfig, OllamaGenerator};
use hybridqa_agent::Agent;
use hybridqa_cli::{init_tracing, load_config};
use hybridqa_sql::SqliteExecutor;
use hybridqa_text::TextIndex;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "hybridqa-batch",
    version,
    about = "Answer a JSONL file of questions over the docs and the database"
)]
struct Args {
    /// Input JSONL, one {id, question, format_hint} per line
    #[arg(long)]
    batch: PathBuf,
    /// Output JSONL, one answer record per input question
    #[arg(long)]
    out: PathBuf,
    /// Directory holding config.toml
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,
    /// Override agent.workers
    #[arg(long)]
    workers: Option<usize>,
    #[arg(long)]
    no_progress: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let (config, mut settings) = load_config(&args.config_dir)?;
    if let Some(workers) = args.workers {
        settings.agent.workers = workers.max(1);
    }

    let docs_dir = config.resolve_path(&settings.data.docs_dir);
    let index = TextIndex::build(&docs_dir)
        .with_context(|| format!("indexing {}", docs_dir.display()))?;
    info!(chunks = index.len(), docs = %docs_dir.display(), "text index ready");

    let db_path = config.resolve_path(&settings.data.db_path);
    let executor = SqliteExecutor::open(&db_path)
        .with_context(|| format!("opening {}", db_path.display()))?;

    let ollama: OllamaConfig = config.get_or_default("ollama")?;
    info!(model = %ollama.chat_model, "using Ollama generator");
    let generator = OllamaGenerator::new(ollama);

    let agent = Arc::new(Agent::new(
        Arc::new(index),
        Arc::new(executor),
        Arc::new(generator),
        &settings,
    ));
    let options = BatchOptions {
        workers: settings.agent.workers,
        question_timeout: Duration::from_secs(settings.agent.question_timeout_secs),
        show_progress: !args.no_progress,
    };
    let written = run_batch(agent, &args.batch, &args.out, &options)?;
    info!(written, out = %args.out.display(), "done");
    Ok(())
}
