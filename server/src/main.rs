use anyhow::Result;
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use server::build_app_from_corpus;
use simcore::config::VectorizerArgs;
use tokio::net::TcpListener;

/// Serve content-based recommendations over HTTP for a cleaned corpus
#[derive(Parser)]
#[command(name = "server")]
struct Args {
    /// Corpus path (JSON/JSONL file or directory of cleaned documents)
    #[arg(long)]
    input: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[command(flatten)]
    vectorizer: VectorizerArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let app: Router = build_app_from_corpus(&args.input, &args.vectorizer)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
