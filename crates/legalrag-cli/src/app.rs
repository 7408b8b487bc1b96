//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "legalrag")]
#[command(
    author,
    version,
    about = "Legal research assistant with cited, confidence-scored answers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, env = "LEGALRAG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full search, research, analysis and synthesis workflow
    Ask(QueryArgs),

    /// Answer with the legal researcher only
    Research(QueryArgs),

    /// Load a file or directory into the vector store
    Ingest(IngestArgs),

    /// Show vector store statistics
    Stats,

    /// Delete every chunk in the collection
    Clear,

    /// Score a document's relevance to a query
    Relevance(RelevanceArgs),

    /// Analyze a legal document
    Analyze(AnalyzeArgs),

    /// Print the effective configuration
    Config,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Legal question
    pub query: Vec<String>,
}

#[derive(Args)]
pub struct IngestArgs {
    /// File or directory (pdf, txt, md, csv)
    pub path: PathBuf,
}

#[derive(Args)]
pub struct RelevanceArgs {
    /// Legal question
    pub query: String,

    /// Document to score
    pub file: PathBuf,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Document to analyze
    pub file: PathBuf,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Cli,
    Json,
    Md,
}
