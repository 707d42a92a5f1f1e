use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use hybridqa_cli::{init_tracing, load_config};
use hybridqa_text::TextIndex;

#[derive(Parser, Debug)]
#[command(name = "hybridqa-search", version, about = "Rank document chunks for a query")]
struct Args {
    query: String,
    #[arg(short, long)]
    k: Option<usize>,
    /// Directory holding config.toml
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let (config, settings) = load_config(&args.config_dir)?;
    let docs_dir = config.resolve_path(&settings.data.docs_dir);
    let index = TextIndex::build(&docs_dir)
        .with_context(|| format!("indexing {}", docs_dir.display()))?;

    let k = args.k.unwrap_or(settings.retrieval.top_k);
    let hits = index.search(&args.query, k)?;
    println!("{} hits for \"{}\" ({} chunks indexed)", hits.len(), args.query, index.len());
    for (i, hit) in hits.iter().enumerate() {
        println!("\n{}. score={:.4}  id={}", i + 1, hit.score, hit.id);
        for line in hit.content.lines() {
            println!("   {line}");
        }
    }
    Ok(())
}
