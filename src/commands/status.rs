use std::fs;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use taxon_suggest::backend::sqlite::{SqliteTaxonIndex, index_counts};
use taxon_suggest::model::IngestManifest;

use super::resolve_db_path;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_path = args.cache_root.join("manifests").join("ingest.json");
    let db_path = resolve_db_path(&args.cache_root, args.db_path.as_ref());

    info!(cache_root = %args.cache_root.display(), "status requested");

    if manifest_path.exists() {
        let raw = fs::read(&manifest_path)
            .with_context(|| format!("failed to read {}", manifest_path.display()))?;
        let manifest: IngestManifest = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", manifest_path.display()))?;

        info!(
            run_id = %manifest.run_id,
            generated_at = %manifest.generated_at,
            source = %manifest.source_path,
            source_sha256 = %manifest.source_sha256,
            records = manifest.record_count,
            upserted = manifest.upserted_count,
            duplicates = manifest.duplicate_count,
            accepted = manifest.accepted_count,
            synonyms = manifest.synonym_count,
            other_status = manifest.other_status_count,
            "loaded ingest manifest"
        );
    } else {
        warn!(path = %manifest_path.display(), "ingest manifest missing");
    }

    if !db_path.exists() {
        warn!(path = %db_path.display(), "taxon index missing");
        return Ok(());
    }

    let connection = SqliteTaxonIndex::new(&db_path).open_read_only()?;
    let (statuses, ranks) = index_counts(&connection)?;

    for (status, count) in &statuses {
        info!(status = %status, count, "taxa by status");
    }
    for (rank, count) in &ranks {
        info!(rank = %rank, count, "taxa by rank");
    }

    let total: i64 = statuses.iter().map(|(_, count)| count).sum();
    info!(path = %db_path.display(), total, "taxon index ready");

    Ok(())
}
