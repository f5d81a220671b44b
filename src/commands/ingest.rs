use anyhow::{Result, bail};
use chrono::Utc;
use tracing::info;

use crate::cli::IngestArgs;
use taxon_suggest::backend::sqlite::{open_for_write, upsert_records};
use taxon_suggest::model::{IngestManifest, TaxonomicStatus};
use taxon_suggest::util::{
    ensure_parent_directory, ingest_stamp, read_records_json, sha256_file, write_json_pretty,
};

use super::resolve_db_path;

pub fn run(args: IngestArgs) -> Result<()> {
    let (run_id, generated_at) = ingest_stamp(Utc::now());
    let db_path = resolve_db_path(&args.cache_root, args.db_path.as_ref());
    let manifest_path = args
        .manifest_path
        .clone()
        .unwrap_or_else(|| args.cache_root.join("manifests").join("ingest.json"));

    info!(run_id = %run_id, source = %args.source.display(), "ingest started");

    let records = read_records_json(&args.source)?;
    if records.is_empty() {
        bail!("no taxon records found in {}", args.source.display());
    }
    let source_sha256 = sha256_file(&args.source)?;

    ensure_parent_directory(&db_path)?;

    let mut connection = open_for_write(&db_path)?;
    let counts = upsert_records(&mut connection, &records)?;

    let status_count = |wanted: fn(&TaxonomicStatus) -> bool| {
        records
            .iter()
            .filter(|record| wanted(&record.taxonomic_status))
            .count()
    };

    let manifest = IngestManifest {
        manifest_version: 1,
        run_id,
        generated_at,
        source_path: args.source.display().to_string(),
        source_sha256,
        db_path: db_path.display().to_string(),
        record_count: records.len(),
        upserted_count: counts.upserted,
        duplicate_count: counts.duplicates,
        accepted_count: status_count(|status| *status == TaxonomicStatus::Accepted),
        synonym_count: status_count(|status| *status == TaxonomicStatus::Synonym),
        other_status_count: status_count(|status| matches!(status, TaxonomicStatus::Other(_))),
    };

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote ingest manifest");
    info!(
        records = manifest.record_count,
        upserted = manifest.upserted_count,
        duplicates = manifest.duplicate_count,
        synonyms = manifest.synonym_count,
        "ingest completed"
    );

    Ok(())
}
