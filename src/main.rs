//! Console launcher for the support agent.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use support_rag::embedding::EmbeddingProvider;
use support_rag::{
    Config, DiskVectorStore, GeminiChatModel, GeminiEmbeddingProvider, KnowledgeBase,
    RecursiveChunker, SupportAgent, ToolRegistry, console,
};

/// Retrieval-augmented customer support agent console.
#[derive(Parser)]
#[command(name = "support-agent", version, about)]
struct Args {
    /// Override the vector collection directory.
    #[arg(long)]
    db_dir: Option<PathBuf>,

    /// Override the staging directory for uploaded files.
    #[arg(long)]
    kb_dir: Option<PathBuf>,

    /// Override the chat model identifier.
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("support_rag=info")),
        )
        .init();

    let args = Args::parse();
    let mut config = Config::from_env().context("configuration validation failed")?;
    if let Some(db_dir) = args.db_dir {
        config.persist_dir = db_dir;
    }
    if let Some(kb_dir) = args.kb_dir {
        config.staging_dir = kb_dir;
    }
    if let Some(model) = args.model {
        config.model = model;
    }
    config.ensure_directories().context("failed to create data directories")?;

    let embedder = Arc::new(GeminiEmbeddingProvider::new(&config.api_key)?);
    let store =
        Arc::new(DiskVectorStore::open(&config.persist_dir, embedder.dimensions()).await?);
    let knowledge = Arc::new(KnowledgeBase::new(
        store,
        embedder,
        Arc::new(RecursiveChunker::default()),
        &config.persist_dir,
    ));

    let model = GeminiChatModel::new(&config.api_key, &config.model)?
        .with_temperature(config.temperature)
        .with_max_output_tokens(config.max_output_tokens);
    let tools = ToolRegistry::support_tools(knowledge.clone());
    let mut agent =
        SupportAgent::new(Arc::new(model), tools, config.temperature, config.max_output_tokens);

    console::run(&mut agent, &knowledge).await
}
