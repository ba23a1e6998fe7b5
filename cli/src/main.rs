use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use simcore::config::{fit_from_path, VectorizerArgs};
use simcore::CorpusIndex;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "recommend")]
#[command(about = "Recommend similar items from their text descriptions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the items most similar to a given one
    Similar {
        /// Input path (JSON/JSONL file or directory)
        #[arg(long)]
        input: String,
        /// Identity of the item to start from (case-insensitive)
        #[arg(long)]
        title: String,
        /// Number of recommendations
        #[arg(short, long, default_value_t = 5)]
        k: usize,
        #[command(flatten)]
        vectorizer: VectorizerArgs,
    },
    /// Print corpus size, vocabulary size and the rarest terms
    Vocab {
        /// Input path (JSON/JSONL file or directory)
        #[arg(long)]
        input: String,
        /// How many terms to list
        #[arg(long, default_value_t = 20)]
        top: usize,
        #[command(flatten)]
        vectorizer: VectorizerArgs,
    },
}

/// The `n` terms with the highest idf, i.e. the rarest in the corpus. Ties keep vocabulary order.
fn top_idf_terms(index: &CorpusIndex, n: usize) -> Vec<(String, f32)> {
    let idf = index.idf_weights();
    let mut terms: Vec<(String, f32)> = index
        .vocabulary()
        .iter()
        .map(|(tid, term)| (term.to_string(), idf[tid as usize]))
        .collect();
    terms.sort_by(|a, b| b.1.total_cmp(&a.1));
    terms.truncate(n);
    terms
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Similar { input, title, k, vectorizer } => {
            let handle = fit_from_path(&input, vectorizer.to_config()?)?;
            let recs = handle.recommend(&title, k).with_context(|| format!("no recommendations for {title:?}"))?;
            for (rank, rec) in recs.iter().enumerate() {
                println!("{:>2}. {}  (distance {:.4})", rank + 1, rec.identity, rec.distance);
            }
            Ok(())
        }
        Commands::Vocab { input, top, vectorizer } => {
            let handle = fit_from_path(&input, vectorizer.to_config()?)?;
            let index = handle.index();
            println!("documents: {}", index.len());
            println!("terms:     {}", index.vocabulary().len());
            for (term, idf) in top_idf_terms(index, top) {
                println!("{idf:>8.4}  {term}");
            }
            Ok(())
        }
    }
}
