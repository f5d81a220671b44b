use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "taxon-suggest",
    version,
    about = "Taxon suggestion ranking and synonym resolution over a local taxonomy index"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Ingest(IngestArgs),
    Suggest(SuggestArgs),
    Resolve(ResolveArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    #[arg(long, default_value = ".cache/taxon-suggest")]
    pub cache_root: PathBuf,

    /// JSON array of taxon records, or a saved search response.
    #[arg(long)]
    pub source: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SuggestArgs {
    #[arg(long, default_value = ".cache/taxon-suggest")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub query: String,

    /// Rank a saved batch instead of searching the index.
    #[arg(long)]
    pub records: Option<PathBuf>,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = 30)]
    pub per_page: u32,

    #[arg(long, default_value_t = false)]
    pub include_all_taxa: bool,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    #[arg(long, default_value = ".cache/taxon-suggest")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Scientific name of the taxon the user picked.
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub rank: Option<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/taxon-suggest")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}
