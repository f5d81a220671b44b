pub mod ingest;
pub mod resolve;
pub mod status;
pub mod suggest;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::runtime::Runtime;

use taxon_suggest::backend::sqlite::DEFAULT_DB_FILENAME;

fn resolve_db_path(cache_root: &Path, db_path: Option<&PathBuf>) -> PathBuf {
    db_path
        .cloned()
        .unwrap_or_else(|| cache_root.join(DEFAULT_DB_FILENAME))
}

/// The engine runs single-threaded; async lookups share one event loop.
fn event_loop() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}
